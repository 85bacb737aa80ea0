//! Weekly time model: teaching days, times of day, session lengths and the
//! half-open intervals they span.
//!
//! Two intervals overlap when `a.start < b.end && b.start < a.end`.
//! Back-to-back sessions (one ends exactly when the other starts) do NOT overlap.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// A teaching day. Ordering follows the week and is only used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Lower-case key, as submitted by the scheduling form.
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        };
        f.write_str(name)
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    /// Case-insensitive; accepts full names and three-letter abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == lower || day.as_str()[..3] == lower)
            .ok_or_else(|| ValidationError::UnknownDay(s.to_string()))
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
        }
    }
}

impl TryFrom<chrono::Weekday> for Weekday {
    type Error = ValidationError;

    fn try_from(day: chrono::Weekday) -> Result<Self, Self::Error> {
        match day {
            chrono::Weekday::Mon => Ok(Weekday::Monday),
            chrono::Weekday::Tue => Ok(Weekday::Tuesday),
            chrono::Weekday::Wed => Ok(Weekday::Wednesday),
            chrono::Weekday::Thu => Ok(Weekday::Thursday),
            chrono::Weekday::Fri => Ok(Weekday::Friday),
            weekend => Err(ValidationError::UnknownDay(weekend.to_string())),
        }
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A point in the day, in minutes since midnight (0..=1439).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: u16 = 24 * 60 - 1;

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= Self::LAST_MINUTE).then_some(TimeOfDay(minutes))
    }

    /// Clamps to the last minute of the day instead of failing.
    pub const fn saturating(minutes: u16) -> Self {
        if minutes > Self::LAST_MINUTE {
            TimeOfDay(Self::LAST_MINUTE)
        } else {
            TimeOfDay(minutes)
        }
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        // hour() < 24 and minute() < 60, so this is always in range.
        TimeOfDay((t.hour() * 60 + t.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Parses "H:MM" or "HH:MM" (24-hour clock).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map(TimeOfDay::from)
            .map_err(|_| ValidationError::InvalidStartTime(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Length of a session in whole minutes. Always positive.
///
/// Callers think in hours (`1.5`), so that is the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionLength(u32);

impl SessionLength {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes > 0).then_some(SessionLength(minutes))
    }

    /// Converts fractional hours, rounding to the nearest minute.
    pub fn from_hours(hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(ValidationError::InvalidDuration(hours.to_string()));
        }
        let minutes = (hours * 60.0).round();
        if minutes < 1.0 || minutes > f64::from(u32::MAX) {
            return Err(ValidationError::InvalidDuration(hours.to_string()));
        }
        Ok(SessionLength(minutes as u32))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hours(self) -> f64 {
        f64::from(self.0) / 60.0
    }
}

impl fmt::Display for SessionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.hours())
    }
}

impl Serialize for SessionLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.hours())
    }
}

impl<'de> Deserialize<'de> for SessionLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hours = f64::deserialize(deserializer)?;
        SessionLength::from_hours(hours).map_err(de::Error::custom)
    }
}

/// A half-open range `[start, end)` in minutes since midnight.
///
/// `end` may pass 1440 for a session that would run past midnight; such
/// sessions are rejected by validation but the arithmetic stays total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: TimeOfDay, length: SessionLength) -> Self {
        let start = u32::from(start.minutes());
        Interval {
            start,
            end: start.saturating_add(length.minutes()),
        }
    }

    pub fn length_minutes(&self) -> u32 {
        self.end - self.start
    }

    /// `true` iff the two ranges share at least one minute.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes shared by both ranges, `0` when they do not overlap.
    pub fn overlap_minutes(&self, other: &Interval) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }
        self.end.min(other.end) - self.start.max(other.start)
    }

    /// `true` when one range ends exactly where the other begins.
    pub fn touches(&self, other: &Interval) -> bool {
        self.end == other.start || other.end == self.start
    }
}

impl fmt::Display for Interval {
    /// `9:00-10:30`. An end at midnight prints as `24:00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}-{}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn hours(h: f64) -> SessionLength {
        SessionLength::from_hours(h).unwrap()
    }

    #[test]
    fn parses_single_and_double_digit_hours() {
        assert_eq!(at("9:00").minutes(), 540);
        assert_eq!(at("09:30").minutes(), 570);
        assert_eq!(at("19:00").minutes(), 1140);
        assert_eq!(at("9:30").to_string(), "9:30");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "9", "25:00", "9:60", "nine", "9:00pm"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn weekday_parsing_ignores_case() {
        assert_eq!("Monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("FRIDAY".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert_eq!("wed".parse::<Weekday>().unwrap(), Weekday::Wednesday);
        assert!("saturday".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_order_follows_week() {
        let mut days = vec![Weekday::Friday, Weekday::Monday, Weekday::Wednesday];
        days.sort();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
    }

    #[test]
    fn session_length_from_hours() {
        assert_eq!(hours(1.5).minutes(), 90);
        assert_eq!(hours(0.5).minutes(), 30);
        assert!(SessionLength::from_hours(0.0).is_err());
        assert!(SessionLength::from_hours(-1.0).is_err());
        assert!(SessionLength::from_hours(f64::NAN).is_err());
    }

    #[test]
    fn interval_end_is_start_plus_length() {
        let iv = Interval::new(at("9:00"), hours(1.5));
        assert_eq!(iv.start, 540);
        assert_eq!(iv.end, 630);
        assert_eq!(iv.length_minutes(), 90);
        assert_eq!(iv.to_string(), "9:00-10:30");
    }

    #[test]
    fn interval_end_saturates_for_huge_lengths() {
        let huge = SessionLength::from_minutes(u32::MAX).unwrap();
        let iv = Interval::new(at("23:00"), huge);
        assert_eq!(iv.end, u32::MAX);
        assert!(iv.overlaps(&Interval::new(at("23:30"), hours(0.5))));
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        let a = Interval::new(at("9:00"), hours(1.5));
        let b = Interval::new(at("10:30"), hours(1.0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.touches(&b));
        assert_eq!(a.overlap_minutes(&b), 0);
    }

    #[test]
    fn identical_starts_always_overlap() {
        let a = Interval::new(at("14:00"), hours(0.5));
        let b = Interval::new(at("14:00"), hours(3.0));
        assert!(a.overlaps(&b));
        assert_eq!(a.overlap_minutes(&b), 30);
    }

    #[test]
    fn serde_uses_caller_facing_forms() {
        assert_eq!(serde_json::to_string(&Weekday::Tuesday).unwrap(), "\"tuesday\"");
        assert_eq!(serde_json::to_string(&at("8:00")).unwrap(), "\"8:00\"");
        assert_eq!(serde_json::to_string(&hours(1.5)).unwrap(), "1.5");
        let day: Weekday = serde_json::from_str("\"Thursday\"").unwrap();
        assert_eq!(day, Weekday::Thursday);
    }
}
