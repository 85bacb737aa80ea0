//! The scheduling service: every timetable mutation goes through here.
//!
//! Each command validates its payload, checks for conflicts, and mutates the
//! store while holding a single write lock, so two conflicting bookings can
//! never coexist even with concurrent callers. Reads take the read lock and
//! return owned snapshots.
//!
//! Lifecycle of a booking:
//!
//! ```text
//! (none) --create--> Scheduled --reschedule--> Scheduled
//!                        |  ^                       |
//!                      flag  \---reschedule---  NeedsRescheduling
//!                        v                          |
//!                 NeedsRescheduling ---delete---> (gone)
//! ```

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::booking::{Booking, BookingId, BookingInput, Slot};
use crate::conflict::{self, Clash, ConflictReport, ClashPair};
use crate::directory::{Directory, ReferenceKind, ReferenceLookup};
use crate::error::{Result, TimetableError, ValidationError};
use crate::freebusy::{self, FreeWindow, Resource};
use crate::policy::SchedulingPolicy;
use crate::store::BookingStore;
use crate::time::Weekday;
use crate::timetable::{self, Summary, TimetableEntry};

#[derive(Debug, Default)]
pub struct SchedulingService {
    store: RwLock<BookingStore>,
    directory: RwLock<Directory>,
    policy: SchedulingPolicy,
}

impl SchedulingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn with_directory(self, directory: Directory) -> Self {
        Self {
            directory: RwLock::new(directory),
            ..self
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Snapshot of the reference directory.
    pub fn directory(&self) -> Directory {
        self.read_directory().clone()
    }

    /// Parse and range-check a payload without touching the store.
    pub fn validate(&self, input: &BookingInput) -> Result<Slot> {
        let slot = if self.policy.require_known_references {
            let directory = self.read_directory();
            input.validate(&self.policy, Some(&*directory as &dyn ReferenceLookup))?
        } else {
            input.validate(&self.policy, None)?
        };
        Ok(slot)
    }

    /// Schedule a new session.
    ///
    /// Fails with `Validation` on a bad payload and `Conflict` when the
    /// faculty member or room is already booked; the store is untouched in
    /// both cases.
    pub fn create(&self, input: &BookingInput) -> Result<Booking> {
        let slot = self.validate(input)?;
        let mut store = self.write_store();
        let report = conflict::find_conflict(&slot, &store, None);
        if report.has_conflict() {
            return Err(TimetableError::Conflict(report));
        }
        let id = store.allocate_id()?;
        let booking = slot.into_booking(id);
        store.insert(booking.clone())?;
        Ok(booking)
    }

    /// Replace the full placement of an existing booking.
    ///
    /// The booking is checked against every other booking, never against its
    /// own current placement. On success the rescheduling flag is cleared.
    pub fn reschedule(&self, id: BookingId, input: &BookingInput) -> Result<Booking> {
        let slot = self.validate(input)?;
        let mut store = self.write_store();
        if !store.contains(id) {
            return Err(TimetableError::NotFound(id));
        }
        let report = conflict::find_conflict(&slot, &store, Some(id));
        if report.has_conflict() {
            return Err(TimetableError::Conflict(report));
        }
        store.update(id, slot).cloned()
    }

    /// Remove a booking. Callers that treat deletion as idempotent can ignore
    /// `NotFound`.
    pub fn delete(&self, id: BookingId) -> Result<()> {
        self.write_store().remove(id).map(|_| ())
    }

    /// Flag a booking for attention without moving it or re-checking conflicts.
    pub fn mark_needs_rescheduling(&self, id: BookingId, reason: impl Into<String>) -> Result<Booking> {
        self.write_store()
            .set_flag(id, Some(reason.into()))
            .cloned()
    }

    /// Validate `input` and report what it would collide with, without
    /// changing anything. Pass the booking's own id as `exclude` when
    /// previewing a reschedule.
    pub fn check(&self, input: &BookingInput, exclude: Option<BookingId>) -> Result<ConflictReport> {
        let slot = self.validate(input)?;
        Ok(conflict::find_conflict(&slot, &self.read_store(), exclude))
    }

    pub fn get(&self, id: BookingId) -> Result<Booking> {
        self.read_store().get(id).cloned()
    }

    pub fn all(&self) -> Vec<Booking> {
        self.read_store().all()
    }

    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    /// Replace the whole timetable with a saved snapshot.
    ///
    /// Each booking is validated like a `create` payload and keeps its id
    /// and rescheduling flag. Rejects invalid bookings, repeated ids and any
    /// pair of bookings that double-books a faculty member or room; on
    /// failure the current timetable is kept.
    pub fn restore(&self, bookings: Vec<Booking>) -> Result<()> {
        let mut fresh = BookingStore::new();
        for booking in bookings {
            let slot = self.validate(&BookingInput::from(&booking))?;
            let mut restored = slot.into_booking(booking.id);
            restored.needs_rescheduling = booking.needs_rescheduling;
            restored.reschedule_reason = booking.reschedule_reason;
            fresh.insert(restored)?;
        }
        if let Some(pair) = conflict::audit(&fresh).into_iter().next() {
            return Err(TimetableError::Conflict(report_for_pair(&pair)));
        }
        *self.write_store() = fresh;
        Ok(())
    }

    /// Every pair of bookings that currently double-books something.
    pub fn audit(&self) -> Vec<ClashPair> {
        conflict::audit(&self.read_store())
    }

    /// Flag every booking taught by `faculty_id`. Returns the flagged bookings.
    pub fn flag_faculty(&self, faculty_id: &str, reason: &str) -> Vec<Booking> {
        flag_where(&mut self.write_store(), &Resource::Faculty(faculty_id.to_string()), reason)
    }

    /// Flag every booking held in `room_id`. Returns the flagged bookings.
    pub fn flag_room(&self, room_id: &str, reason: &str) -> Vec<Booking> {
        flag_where(&mut self.write_store(), &Resource::Room(room_id.to_string()), reason)
    }

    /// Record a faculty member's availability. Marking them unavailable flags
    /// all of their bookings with `reason`; returns the bookings flagged.
    ///
    /// The directory and store locks are held together, so every booking that
    /// exists when the change lands is flagged. Availability does not gate
    /// later `create` calls.
    pub fn set_faculty_available(&self, faculty_id: &str, available: bool, reason: &str) -> Result<Vec<Booking>> {
        let mut directory = self.write_directory();
        if !directory.set_faculty_available(faculty_id, available) {
            return Err(unknown(ReferenceKind::Faculty, faculty_id));
        }
        if available {
            return Ok(Vec::new());
        }
        let resource = Resource::Faculty(faculty_id.to_string());
        Ok(flag_where(&mut self.write_store(), &resource, reason))
    }

    /// Record a classroom's availability. Marking it unavailable flags every
    /// booking held there with `reason`; returns the bookings flagged.
    ///
    /// Locking is the same as for
    /// [`set_faculty_available`](Self::set_faculty_available).
    pub fn set_classroom_available(&self, room_id: &str, available: bool, reason: &str) -> Result<Vec<Booking>> {
        let mut directory = self.write_directory();
        if !directory.set_classroom_available(room_id, available) {
            return Err(unknown(ReferenceKind::Room, room_id));
        }
        if available {
            return Ok(Vec::new());
        }
        let resource = Resource::Room(room_id.to_string());
        Ok(flag_where(&mut self.write_store(), &resource, reason))
    }

    pub fn needing_rescheduling(&self) -> Vec<Booking> {
        self.read_store()
            .iter()
            .filter(|b| b.needs_rescheduling)
            .cloned()
            .collect()
    }

    /// All bookings ordered by day and start time, with display names.
    pub fn timetable(&self) -> Vec<TimetableEntry> {
        let bookings = self.all();
        timetable::weekly_listing(bookings, &self.read_directory())
    }

    pub fn summary(&self) -> Summary {
        timetable::summarize(self.read_store().iter())
    }

    /// Gaps on `day` between the policy's earliest start and day end where
    /// none of `resources` is booked.
    pub fn free_windows(&self, day: Weekday, resources: &[Resource]) -> Vec<FreeWindow> {
        let store = self.read_store();
        let busy = store
            .iter()
            .filter(|b| b.day == day && resources.iter().any(|r| r.uses(b)));
        freebusy::free_windows(day, busy, self.policy.earliest_start, self.policy.day_end)
    }

    // A panic while holding a lock cannot leave the store half-written: every
    // command checks first and mutates last, so a poisoned lock is still usable.
    fn read_store(&self) -> RwLockReadGuard<'_, BookingStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, BookingStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_directory(&self) -> RwLockReadGuard<'_, Directory> {
        self.directory.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_directory(&self) -> RwLockWriteGuard<'_, Directory> {
        self.directory.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn flag_where(store: &mut BookingStore, resource: &Resource, reason: &str) -> Vec<Booking> {
    let ids: Vec<BookingId> = store
        .iter()
        .filter(|b| resource.uses(b))
        .map(|b| b.id)
        .collect();
    ids.into_iter()
        .filter_map(|id| store.set_flag(id, Some(reason.to_string())).ok().cloned())
        .collect()
}

fn unknown(kind: ReferenceKind, id: &str) -> TimetableError {
    TimetableError::Validation(ValidationError::UnknownReference {
        kind,
        id: id.to_string(),
    })
}

fn report_for_pair(pair: &ClashPair) -> ConflictReport {
    ConflictReport {
        faculty: pair.dimension.includes_faculty(),
        room: pair.dimension.includes_room(),
        clashes: vec![Clash {
            booking_id: pair.second,
            dimension: pair.dimension,
            overlap_minutes: pair.overlap_minutes,
        }],
    }
}
