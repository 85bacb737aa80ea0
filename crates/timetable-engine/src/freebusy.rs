//! Free windows in a faculty member's or room's teaching day.
//!
//! Sorts the relevant bookings by start, merges overlapping or back-to-back
//! busy periods, then reports the gaps inside the day window. This is a view
//! for the person picking a slot; the engine never picks one itself.

use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::time::{Interval, TimeOfDay, Weekday};

/// A resource whose day can be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum Resource {
    Faculty(String),
    Room(String),
}

impl Resource {
    pub fn uses(&self, booking: &Booking) -> bool {
        match self {
            Resource::Faculty(id) => booking.faculty_id == *id,
            Resource::Room(id) => booking.room_id == *id,
        }
    }
}

/// A gap with nothing booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeWindow {
    pub day: Weekday,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub duration_minutes: u32,
}

/// Merge overlapping or adjacent busy periods, clipped to the window.
///
/// Returns a sorted, non-overlapping list of intervals.
fn merge_busy_periods(busy: impl IntoIterator<Item = Interval>, window: Interval) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = busy
        .into_iter()
        .filter(|iv| iv.start < window.end && iv.end > window.start)
        .map(|iv| Interval {
            start: iv.start.max(window.start),
            end: iv.end.min(window.end),
        })
        .collect();
    intervals.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        if let Some(last) = merged.last_mut() {
            if iv.start <= last.end {
                last.end = last.end.max(iv.end);
                continue;
            }
        }
        merged.push(iv);
    }
    merged
}

/// Gaps between `window_start` and `window_end` on `day` not covered by any
/// of `bookings`. Bookings on other days are ignored.
pub fn free_windows<'a>(
    day: Weekday,
    bookings: impl IntoIterator<Item = &'a Booking>,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
) -> Vec<FreeWindow> {
    if window_start >= window_end {
        return Vec::new();
    }
    let window = Interval {
        start: u32::from(window_start.minutes()),
        end: u32::from(window_end.minutes()),
    };
    let busy = bookings
        .into_iter()
        .filter(|b| b.day == day)
        .map(Booking::interval);
    let merged = merge_busy_periods(busy, window);

    let mut free = Vec::new();
    let mut cursor = window.start;
    for iv in &merged {
        if cursor < iv.start {
            free.push(window_between(day, cursor, iv.start));
        }
        cursor = cursor.max(iv.end);
    }
    if cursor < window.end {
        free.push(window_between(day, cursor, window.end));
    }
    free
}

// Both bounds are clipped to the window, which lies inside one day.
fn window_between(day: Weekday, start: u32, end: u32) -> FreeWindow {
    FreeWindow {
        day,
        start: TimeOfDay::saturating(start as u16),
        end: TimeOfDay::saturating(end as u16),
        duration_minutes: end - start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{BookingId, BookingInput};
    use crate::policy::SchedulingPolicy;

    fn booking(id: u64, day: &str, start: &str, hours: f64) -> Booking {
        BookingInput::new(day, start, hours, "S1", "F1", "R1")
            .validate(&SchedulingPolicy::default(), None)
            .unwrap()
            .into_booking(BookingId(id))
    }

    fn at(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn empty_day_is_one_window() {
        let free = free_windows(Weekday::Monday, &[], at("8:00"), at("20:00"));
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].duration_minutes, 720);
    }

    #[test]
    fn gaps_between_bookings() {
        let bookings = [
            booking(1, "monday", "9:00", 1.5),
            booking(2, "monday", "10:30", 1.0), // back-to-back with 1
            booking(3, "monday", "14:00", 2.0),
            booking(4, "tuesday", "8:00", 3.0), // other day
        ];
        let free = free_windows(Weekday::Monday, &bookings, at("8:00"), at("20:00"));
        let spans: Vec<(String, String)> = free
            .iter()
            .map(|w| (w.start.to_string(), w.end.to_string()))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("8:00".to_string(), "9:00".to_string()),
                ("11:30".to_string(), "14:00".to_string()),
                ("16:00".to_string(), "20:00".to_string()),
            ]
        );
    }

    #[test]
    fn busy_past_window_end_is_clipped() {
        let bookings = [booking(1, "friday", "19:00", 3.0)];
        let free = free_windows(Weekday::Friday, &bookings, at("8:00"), at("20:00"));
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].end, at("19:00"));
    }

    #[test]
    fn inverted_window_is_empty() {
        assert!(free_windows(Weekday::Monday, &[], at("20:00"), at("8:00")).is_empty());
    }
}
