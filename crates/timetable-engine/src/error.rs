//! Error types for timetable-engine operations.

use thiserror::Error;

use crate::booking::BookingId;
use crate::conflict::ConflictReport;
use crate::directory::ReferenceKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimetableError {
    #[error("Invalid booking: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scheduling conflict: {0}")]
    Conflict(ConflictReport),

    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// The store was handed an id it already holds. Ids are allocated by the
    /// store, so this only happens when a restored snapshot repeats an id.
    #[error("Duplicate booking id: {0}")]
    DuplicateId(BookingId),

    /// The id counter already stands at `u64::MAX`.
    #[error("No booking ids left after {0}")]
    IdsExhausted(BookingId),
}

/// Why a booking payload was rejected before any conflict check ran.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("unknown day '{0}' (expected monday..friday)")]
    UnknownDay(String),

    #[error("invalid start time '{0}' (expected H:MM)")]
    InvalidStartTime(String),

    #[error("start time {start} is outside {earliest}..={latest}")]
    StartOutOfRange {
        start: String,
        earliest: String,
        latest: String,
    },

    #[error("invalid duration '{0}' (expected a positive number of hours)")]
    InvalidDuration(String),

    #[error("duration of {minutes} minutes is outside {min}..={max} minutes")]
    DurationOutOfRange { minutes: u32, min: u32, max: u32 },

    #[error("duration of {minutes} minutes is not a multiple of {granularity} minutes")]
    DurationGranularity { minutes: u32, granularity: u32 },

    #[error("session starting at {start} for {minutes} minutes runs past midnight")]
    PastMidnight { start: String, minutes: u32 },

    #[error("unknown {kind} '{id}'")]
    UnknownReference { kind: ReferenceKind, id: String },
}

pub type Result<T> = std::result::Result<T, TimetableError>;
