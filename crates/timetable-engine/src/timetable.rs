//! Read-only timetable views: the sorted weekly listing and dashboard counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::directory::{Directory, ReferenceKind};
use crate::time::Weekday;

/// A booking joined with the display names of what it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    #[serde(flatten)]
    pub booking: Booking,
    pub faculty_name: String,
    pub room_name: String,
    pub subject_name: String,
}

/// Sort by day, then start time, then id, and resolve names. Dangling
/// references show as [`crate::directory::UNKNOWN_NAME`].
pub fn weekly_listing(bookings: Vec<Booking>, directory: &Directory) -> Vec<TimetableEntry> {
    let mut bookings = bookings;
    bookings.sort_by_key(|b| (b.day, b.start, b.id));
    bookings
        .into_iter()
        .map(|booking| TimetableEntry {
            faculty_name: directory.name_of(ReferenceKind::Faculty, &booking.faculty_id),
            room_name: directory.name_of(ReferenceKind::Room, &booking.room_id),
            subject_name: directory.name_of(ReferenceKind::Subject, &booking.subject_id),
            booking,
        })
        .collect()
}

/// Dashboard counts over the live bookings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub needs_rescheduling: usize,
    pub per_day: BTreeMap<Weekday, usize>,
    /// Scheduled teaching minutes per faculty id.
    pub faculty_minutes: BTreeMap<String, u32>,
    /// Occupied minutes per room id.
    pub room_minutes: BTreeMap<String, u32>,
}

pub fn summarize<'a>(bookings: impl IntoIterator<Item = &'a Booking>) -> Summary {
    let mut summary = Summary {
        per_day: Weekday::ALL.into_iter().map(|d| (d, 0)).collect(),
        ..Summary::default()
    };
    for b in bookings {
        summary.total += 1;
        if b.needs_rescheduling {
            summary.needs_rescheduling += 1;
        }
        *summary.per_day.entry(b.day).or_default() += 1;
        *summary.faculty_minutes.entry(b.faculty_id.clone()).or_default() += b.duration.minutes();
        *summary.room_minutes.entry(b.room_id.clone()).or_default() += b.duration.minutes();
    }
    summary
}
