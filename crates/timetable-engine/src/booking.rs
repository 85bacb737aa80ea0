//! Bookings: one subject taught by one faculty member in one room, in a
//! weekly day/time slot.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::directory::{ReferenceKind, ReferenceLookup};
use crate::error::ValidationError;
use crate::policy::SchedulingPolicy;
use crate::time::{Interval, SessionLength, TimeOfDay, Weekday};

/// Store-allocated booking identifier. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BookingId)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Whole(u64),
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for BookingId {
    /// Accepts `7` as well as `"7"`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Whole(n) => Ok(BookingId(n)),
            NumberOrText::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => {
                Ok(BookingId(n as u64))
            }
            NumberOrText::Number(n) => Err(de::Error::custom(format!("invalid booking id {n}"))),
            NumberOrText::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

/// A scheduled session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub day: Weekday,
    #[serde(alias = "startTime")]
    pub start: TimeOfDay,
    pub duration: SessionLength,
    pub faculty_id: String,
    pub room_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub needs_rescheduling: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reschedule_reason: Option<String>,
}

/// Where a booking sits in its lifecycle. Deleted bookings are simply gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingState {
    Scheduled,
    NeedsRescheduling,
}

impl Booking {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.duration)
    }

    pub fn state(&self) -> BookingState {
        if self.needs_rescheduling {
            BookingState::NeedsRescheduling
        } else {
            BookingState::Scheduled
        }
    }

    /// The scheduling payload of this booking, without id or flags.
    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            start: self.start,
            duration: self.duration,
            faculty_id: self.faculty_id.clone(),
            room_id: self.room_id.clone(),
            subject_id: self.subject_id.clone(),
        }
    }
}

/// A validated scheduling payload: everything a booking has except its id
/// and rescheduling flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub day: Weekday,
    pub start: TimeOfDay,
    pub duration: SessionLength,
    pub faculty_id: String,
    pub room_id: String,
    pub subject_id: String,
}

impl Slot {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.duration)
    }

    /// A fresh, unflagged booking occupying this slot.
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            day: self.day,
            start: self.start,
            duration: self.duration,
            faculty_id: self.faculty_id,
            room_id: self.room_id,
            subject_id: self.subject_id,
            needs_rescheduling: false,
            reschedule_reason: None,
        }
    }
}

/// The raw create/reschedule payload, as a form submits it.
///
/// Every field is required; empty strings count as missing. `duration` is a
/// number of hours and may arrive as a JSON number or a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingInput {
    pub day: String,
    #[serde(alias = "startTime")]
    pub start: String,
    #[serde(deserialize_with = "hours_as_text")]
    pub duration: String,
    pub subject_id: String,
    pub faculty_id: String,
    pub room_id: String,
}

fn hours_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Whole(n) => n.to_string(),
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    })
}

impl BookingInput {
    pub fn new(
        day: impl Into<String>,
        start: impl Into<String>,
        duration_hours: f64,
        subject_id: impl Into<String>,
        faculty_id: impl Into<String>,
        room_id: impl Into<String>,
    ) -> Self {
        Self {
            day: day.into(),
            start: start.into(),
            duration: duration_hours.to_string(),
            subject_id: subject_id.into(),
            faculty_id: faculty_id.into(),
            room_id: room_id.into(),
        }
    }

    /// Checks required fields, parses day/start/duration, applies the policy
    /// limits and, when `references` is given, rejects unknown ids.
    pub fn validate(
        &self,
        policy: &SchedulingPolicy,
        references: Option<&dyn ReferenceLookup>,
    ) -> Result<Slot, ValidationError> {
        let required = [
            ("day", &self.day),
            ("start", &self.start),
            ("duration", &self.duration),
            ("subjectId", &self.subject_id),
            ("facultyId", &self.faculty_id),
            ("roomId", &self.room_id),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::MissingField(field));
        }

        let day: Weekday = self.day.parse()?;
        let start: TimeOfDay = self.start.parse()?;
        let hours: f64 = self
            .duration
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidDuration(self.duration.clone()))?;
        let duration = SessionLength::from_hours(hours)?;
        policy.check_slot(start, duration)?;

        let slot = Slot {
            day,
            start,
            duration,
            faculty_id: self.faculty_id.trim().to_string(),
            room_id: self.room_id.trim().to_string(),
            subject_id: self.subject_id.trim().to_string(),
        };

        if let Some(lookup) = references {
            let refs = [
                (ReferenceKind::Faculty, &slot.faculty_id),
                (ReferenceKind::Room, &slot.room_id),
                (ReferenceKind::Subject, &slot.subject_id),
            ];
            for (kind, id) in refs {
                if !lookup.exists(kind, id) {
                    return Err(ValidationError::UnknownReference {
                        kind,
                        id: id.clone(),
                    });
                }
            }
        }

        Ok(slot)
    }
}

impl From<&Booking> for BookingInput {
    fn from(b: &Booking) -> Self {
        Self {
            day: b.day.as_str().to_string(),
            start: b.start.to_string(),
            duration: b.duration.hours().to_string(),
            subject_id: b.subject_id.clone(),
            faculty_id: b.faculty_id.clone(),
            room_id: b.room_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BookingInput {
        BookingInput::new("Monday", "9:00", 1.5, "S1", "F1", "R1")
    }

    #[test]
    fn valid_input_becomes_slot() {
        let slot = input().validate(&SchedulingPolicy::default(), None).unwrap();
        assert_eq!(slot.day, Weekday::Monday);
        assert_eq!(slot.start.minutes(), 540);
        assert_eq!(slot.duration.minutes(), 90);
        assert_eq!(slot.interval().end, 630);
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut inp = input();
        inp.subject_id = "  ".into();
        inp.room_id.clear();
        assert_eq!(
            inp.validate(&SchedulingPolicy::default(), None),
            Err(ValidationError::MissingField("subjectId"))
        );

        let empty = BookingInput::default();
        assert_eq!(
            empty.validate(&SchedulingPolicy::default(), None),
            Err(ValidationError::MissingField("day"))
        );
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let policy = SchedulingPolicy::default();
        let mut inp = input();
        inp.day = "Sunday".into();
        assert!(matches!(inp.validate(&policy, None), Err(ValidationError::UnknownDay(_))));

        let mut inp = input();
        inp.duration = "abc".into();
        assert!(matches!(inp.validate(&policy, None), Err(ValidationError::InvalidDuration(_))));

        let mut inp = input();
        inp.duration = "-1".into();
        assert!(matches!(inp.validate(&policy, None), Err(ValidationError::InvalidDuration(_))));

        let mut inp = input();
        inp.start = "20:00".into();
        assert!(matches!(inp.validate(&policy, None), Err(ValidationError::StartOutOfRange { .. })));
    }

    #[test]
    fn form_payload_deserializes() {
        let inp: BookingInput = serde_json::from_str(
            r#"{"day":"monday","startTime":"9:00","duration":"1.5","subjectId":"1","facultyId":"1","roomId":"1"}"#,
        )
        .unwrap();
        assert_eq!(inp.start, "9:00");
        assert_eq!(inp.duration, "1.5");

        let inp: BookingInput = serde_json::from_str(r#"{"day":"friday","duration":2}"#).unwrap();
        assert_eq!(inp.duration, "2");
        assert_eq!(
            inp.validate(&SchedulingPolicy::default(), None),
            Err(ValidationError::MissingField("start"))
        );
    }

    #[test]
    fn booking_reads_reference_mock_shape() {
        let b: Booking = serde_json::from_str(
            r#"{"id":"2","day":"Tuesday","startTime":"11:00","duration":1,"facultyId":"2","roomId":"2","subjectId":"2","needsRescheduling":true}"#,
        )
        .unwrap();
        assert_eq!(b.id, BookingId(2));
        assert_eq!(b.day, Weekday::Tuesday);
        assert_eq!(b.state(), BookingState::NeedsRescheduling);
        assert_eq!(b.reschedule_reason, None);
    }

    #[test]
    fn large_ids_keep_every_digit() {
        let id: BookingId = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(id, BookingId(9_007_199_254_740_993));
        let id: BookingId = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(id, BookingId(u64::MAX));
        assert!(serde_json::from_str::<BookingId>("-1").is_err());
        assert!(serde_json::from_str::<BookingId>("1.5").is_err());
    }

    #[test]
    fn booking_roundtrips_through_input() {
        let slot = input().validate(&SchedulingPolicy::default(), None).unwrap();
        let booking = slot.clone().into_booking(BookingId(4));
        let back = BookingInput::from(&booking)
            .validate(&SchedulingPolicy::default(), None)
            .unwrap();
        assert_eq!(back, slot);
        assert_eq!(booking.slot(), slot);
    }
}
