//! In-memory booking store with per-day faculty and room indexes.
//!
//! Bookings are keyed by [`BookingId`]. Ids come from the store's own
//! monotonic counter, so key order is also insertion order.
//!
//! Alongside the primary map the store keeps two secondary indexes,
//! `faculty -> day -> {(start, id)}` and `room -> day -> {(start, id)}`, so a
//! conflict lookup only visits the bookings of one faculty member or one room
//! on one day instead of scanning the whole timetable.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::booking::{Booking, BookingId, Slot};
use crate::error::{Result, TimetableError};
use crate::time::{TimeOfDay, Weekday};

type DayIndex = HashMap<String, BTreeMap<Weekday, BTreeSet<(TimeOfDay, BookingId)>>>;

#[derive(Debug, Clone, Default)]
pub struct BookingStore {
    bookings: BTreeMap<BookingId, Booking>,
    by_faculty: DayIndex,
    by_room: DayIndex,
    last_id: u64,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next unused id. Ids are never reused, even after removal.
    pub fn allocate_id(&mut self) -> Result<BookingId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or(TimetableError::IdsExhausted(BookingId(self.last_id)))?;
        self.last_id = next;
        Ok(BookingId(next))
    }

    /// Add a booking under its own id.
    ///
    /// An externally chosen id moves the allocator past it, so later
    /// [`allocate_id`](Self::allocate_id) calls cannot collide with it.
    pub fn insert(&mut self, booking: Booking) -> Result<()> {
        if self.bookings.contains_key(&booking.id) {
            return Err(TimetableError::DuplicateId(booking.id));
        }
        self.last_id = self.last_id.max(booking.id.0);
        index_add(&mut self.by_faculty, &booking.faculty_id, &booking);
        index_add(&mut self.by_room, &booking.room_id, &booking);
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    /// Replace the scheduling payload of `id`, keeping the id.
    ///
    /// The replacement is a fresh placement, so any rescheduling flag is cleared.
    pub fn update(&mut self, id: BookingId, slot: Slot) -> Result<&Booking> {
        let old = self
            .bookings
            .remove(&id)
            .ok_or(TimetableError::NotFound(id))?;
        index_remove(&mut self.by_faculty, &old.faculty_id, &old);
        index_remove(&mut self.by_room, &old.room_id, &old);

        let booking = slot.into_booking(id);
        index_add(&mut self.by_faculty, &booking.faculty_id, &booking);
        index_add(&mut self.by_room, &booking.room_id, &booking);
        Ok(self.bookings.entry(id).or_insert(booking))
    }

    /// Set or clear the rescheduling flag. Placement and indexes are untouched.
    pub fn set_flag(&mut self, id: BookingId, reason: Option<String>) -> Result<&Booking> {
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or(TimetableError::NotFound(id))?;
        booking.needs_rescheduling = reason.is_some();
        booking.reschedule_reason = reason;
        Ok(booking)
    }

    pub fn remove(&mut self, id: BookingId) -> Result<Booking> {
        let booking = self
            .bookings
            .remove(&id)
            .ok_or(TimetableError::NotFound(id))?;
        index_remove(&mut self.by_faculty, &booking.faculty_id, &booking);
        index_remove(&mut self.by_room, &booking.room_id, &booking);
        Ok(booking)
    }

    pub fn get(&self, id: BookingId) -> Result<&Booking> {
        self.bookings.get(&id).ok_or(TimetableError::NotFound(id))
    }

    pub fn contains(&self, id: BookingId) -> bool {
        self.bookings.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }

    /// Owned snapshot of every live booking.
    pub fn all(&self) -> Vec<Booking> {
        self.bookings.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Bookings of one faculty member on one day, ordered by start time.
    pub fn faculty_day<'a>(
        &'a self,
        faculty_id: &str,
        day: Weekday,
    ) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bucket(&self.by_faculty, faculty_id, day)
    }

    /// Bookings in one room on one day, ordered by start time.
    pub fn room_day<'a>(&'a self, room_id: &str, day: Weekday) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bucket(&self.by_room, room_id, day)
    }

    fn bucket<'a>(
        &'a self,
        index: &'a DayIndex,
        key: &str,
        day: Weekday,
    ) -> impl Iterator<Item = &'a Booking> + 'a {
        index
            .get(key)
            .and_then(|days| days.get(&day))
            .into_iter()
            .flatten()
            .filter_map(|(_, id)| self.bookings.get(id))
    }
}

fn index_add(index: &mut DayIndex, key: &str, booking: &Booking) {
    index
        .entry(key.to_string())
        .or_default()
        .entry(booking.day)
        .or_default()
        .insert((booking.start, booking.id));
}

fn index_remove(index: &mut DayIndex, key: &str, booking: &Booking) {
    let Some(days) = index.get_mut(key) else {
        return;
    };
    if let Some(set) = days.get_mut(&booking.day) {
        set.remove(&(booking.start, booking.id));
        if set.is_empty() {
            days.remove(&booking.day);
        }
    }
    if days.is_empty() {
        index.remove(key);
    }
}
