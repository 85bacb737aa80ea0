//! # timetable-engine
//!
//! Conflict-checked weekly class timetable.
//!
//! A booking places one subject, taught by one faculty member, in one room,
//! at a weekday/time slot. The engine guarantees that no faculty member and
//! no room is ever double-booked: every create and reschedule is validated
//! and checked against the live timetable before it is applied.
//!
//! ## Quick start
//!
//! ```rust
//! use timetable_engine::{BookingInput, SchedulingService, TimetableError};
//!
//! let service = SchedulingService::new();
//! let first = service
//!     .create(&BookingInput::new("Monday", "9:00", 1.5, "S1", "F1", "R1"))
//!     .unwrap();
//!
//! // Same faculty member, overlapping time: rejected.
//! let clash = service.create(&BookingInput::new("Monday", "9:30", 1.0, "S2", "F1", "R2"));
//! assert!(matches!(clash, Err(TimetableError::Conflict(_))));
//!
//! // Back-to-back in the same room: fine.
//! service
//!     .create(&BookingInput::new("Monday", "10:30", 1.0, "S3", "F2", "R1"))
//!     .unwrap();
//! assert_eq!(service.len(), 2);
//! # let _ = first;
//! ```
//!
//! ## Modules
//!
//! - [`time`]: weekdays, times of day, session lengths, half-open intervals
//! - [`booking`]: bookings, ids, and the raw input payload with validation
//! - [`policy`]: start-time and duration limits
//! - [`store`]: booking store with per-day faculty/room indexes
//! - [`conflict`]: faculty/room overlap detection
//! - [`service`]: the scheduling service that enforces the rules
//! - [`directory`]: faculty, classroom and subject reference data
//! - [`freebusy`]: free windows in a faculty member's or room's day
//! - [`timetable`]: sorted weekly listing and dashboard summary
//! - [`error`]: error types

pub mod booking;
pub mod conflict;
pub mod directory;
pub mod error;
pub mod freebusy;
pub mod policy;
pub mod service;
pub mod store;
pub mod time;
pub mod timetable;

pub use booking::{Booking, BookingId, BookingInput, BookingState, Slot};
pub use conflict::{find_conflict, ConflictDimension, ConflictReport};
pub use directory::{Classroom, Directory, Faculty, ReferenceLookup, Subject};
pub use error::{TimetableError, ValidationError};
pub use freebusy::{FreeWindow, Resource};
pub use policy::SchedulingPolicy;
pub use service::SchedulingService;
pub use store::BookingStore;
pub use time::{Interval, SessionLength, TimeOfDay, Weekday};
pub use timetable::{Summary, TimetableEntry};
