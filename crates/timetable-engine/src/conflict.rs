//! Detect faculty and room double-bookings.
//!
//! A candidate slot conflicts with an existing booking when both fall on the
//! same day, share the faculty member or the room, and their intervals overlap
//! (`a.start < b.end && b.start < a.end`). Back-to-back sessions are NOT
//! conflicts.
//!
//! When a booking is being rescheduled, its own id is passed as `exclude` so
//! it is never compared against its previous placement.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::booking::{Booking, BookingId, Slot};
use crate::store::BookingStore;

/// Which resource a conflict is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictDimension {
    Faculty,
    Room,
    Both,
}

impl ConflictDimension {
    fn from_flags(faculty: bool, room: bool) -> Option<Self> {
        match (faculty, room) {
            (true, true) => Some(ConflictDimension::Both),
            (true, false) => Some(ConflictDimension::Faculty),
            (false, true) => Some(ConflictDimension::Room),
            (false, false) => None,
        }
    }

    pub fn includes_faculty(self) -> bool {
        matches!(self, ConflictDimension::Faculty | ConflictDimension::Both)
    }

    pub fn includes_room(self) -> bool {
        matches!(self, ConflictDimension::Room | ConflictDimension::Both)
    }
}

impl fmt::Display for ConflictDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictDimension::Faculty => "faculty",
            ConflictDimension::Room => "room",
            ConflictDimension::Both => "faculty and room",
        })
    }
}

/// One existing booking the candidate collides with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clash {
    pub booking_id: BookingId,
    pub dimension: ConflictDimension,
    pub overlap_minutes: u32,
}

/// Outcome of a conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    /// The faculty member is already teaching during the candidate slot.
    pub faculty: bool,
    /// The room is already in use during the candidate slot.
    pub room: bool,
    /// Every colliding booking, ordered by id.
    pub clashes: Vec<Clash>,
}

impl ConflictReport {
    pub fn has_conflict(&self) -> bool {
        self.faculty || self.room
    }

    pub fn dimension(&self) -> Option<ConflictDimension> {
        ConflictDimension::from_flags(self.faculty, self.room)
    }

    pub fn clashing_ids(&self) -> impl Iterator<Item = BookingId> + '_ {
        self.clashes.iter().map(|c| c.booking_id)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dimension) = self.dimension() else {
            return f.write_str("no conflict");
        };
        let subject = match dimension {
            ConflictDimension::Faculty => "faculty member is already teaching",
            ConflictDimension::Room => "room is already in use",
            ConflictDimension::Both => "faculty member and room are already booked",
        };
        let ids: Vec<String> = self.clashing_ids().map(|id| id.to_string()).collect();
        write!(f, "{subject} at that time (booking {})", ids.join(", "))
    }
}

/// Accumulates per-booking hits from the faculty and room passes.
#[derive(Default)]
struct ReportBuilder {
    hits: BTreeMap<BookingId, (bool, bool, u32)>,
}

impl ReportBuilder {
    fn record(&mut self, candidate: &Slot, existing: &Booking) {
        let overlap = candidate.interval().overlap_minutes(&existing.interval());
        if overlap == 0 || existing.day != candidate.day {
            return;
        }
        let same_faculty = existing.faculty_id == candidate.faculty_id;
        let same_room = existing.room_id == candidate.room_id;
        if !same_faculty && !same_room {
            return;
        }
        let entry = self.hits.entry(existing.id).or_insert((false, false, overlap));
        entry.0 |= same_faculty;
        entry.1 |= same_room;
    }

    fn finish(self) -> ConflictReport {
        let mut report = ConflictReport::default();
        for (booking_id, (faculty, room, overlap_minutes)) in self.hits {
            report.faculty |= faculty;
            report.room |= room;
            if let Some(dimension) = ConflictDimension::from_flags(faculty, room) {
                report.clashes.push(Clash {
                    booking_id,
                    dimension,
                    overlap_minutes,
                });
            }
        }
        report
    }
}

/// Check `candidate` against every booking in `store` except `exclude`.
///
/// Only the candidate's faculty/day and room/day buckets are visited; each
/// bucket is ordered by start time, so the walk stops at the first booking
/// that starts after the candidate ends.
pub fn find_conflict(
    candidate: &Slot,
    store: &BookingStore,
    exclude: Option<BookingId>,
) -> ConflictReport {
    let end = candidate.interval().end;
    let mut builder = ReportBuilder::default();

    let same_faculty = store.faculty_day(&candidate.faculty_id, candidate.day);
    let same_room = store.room_day(&candidate.room_id, candidate.day);
    for existing in same_faculty
        .take_while(|b| u32::from(b.start.minutes()) < end)
        .chain(same_room.take_while(|b| u32::from(b.start.minutes()) < end))
    {
        if Some(existing.id) != exclude {
            builder.record(candidate, existing);
        }
    }

    builder.finish()
}

/// Linear-scan variant of [`find_conflict`] for callers holding a plain list
/// of bookings rather than a [`BookingStore`].
pub fn scan_conflicts<'a>(
    candidate: &Slot,
    bookings: impl IntoIterator<Item = &'a Booking>,
    exclude: Option<BookingId>,
) -> ConflictReport {
    let mut builder = ReportBuilder::default();
    for existing in bookings {
        if Some(existing.id) != exclude {
            builder.record(candidate, existing);
        }
    }
    builder.finish()
}

/// A pair of live bookings that violate the no-double-booking rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashPair {
    pub first: BookingId,
    pub second: BookingId,
    pub dimension: ConflictDimension,
    pub overlap_minutes: u32,
}

/// Find every pair of bookings in `store` that overlap on faculty or room.
///
/// A store only ever filled through the scheduling service yields nothing;
/// this is for vetting restored snapshots and hand-edited timetables.
pub fn audit(store: &BookingStore) -> Vec<ClashPair> {
    let mut pairs = Vec::new();
    for booking in store.iter() {
        let report = find_conflict(&booking.slot(), store, Some(booking.id));
        pairs.extend(
            report
                .clashes
                .into_iter()
                .filter(|c| c.booking_id > booking.id)
                .map(|c| ClashPair {
                    first: booking.id,
                    second: c.booking_id,
                    dimension: c.dimension,
                    overlap_minutes: c.overlap_minutes,
                }),
        );
    }
    pairs
}
