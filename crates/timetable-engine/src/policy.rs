//! Numeric limits a booking must respect before it is checked for conflicts.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{Interval, SessionLength, TimeOfDay};

/// Scheduling limits. The defaults match the scheduling form: hourly starts
/// from 8:00 to 19:00, sessions of 0.5 to 3 hours in half-hour steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulingPolicy {
    pub earliest_start: TimeOfDay,
    pub latest_start: TimeOfDay,
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
    pub granularity_minutes: u32,
    /// End of the teaching day. Only bounds the free-window view.
    pub day_end: TimeOfDay,
    /// Reject ids that the attached directory does not know.
    pub require_known_references: bool,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            earliest_start: TimeOfDay::saturating(8 * 60),
            latest_start: TimeOfDay::saturating(19 * 60),
            min_duration_minutes: 30,
            max_duration_minutes: 180,
            granularity_minutes: 30,
            day_end: TimeOfDay::saturating(20 * 60),
            require_known_references: false,
        }
    }
}

impl SchedulingPolicy {
    /// A policy with no practical limits beyond "inside one day".
    pub fn unrestricted() -> Self {
        Self {
            earliest_start: TimeOfDay::MIDNIGHT,
            latest_start: TimeOfDay::saturating(TimeOfDay::LAST_MINUTE),
            min_duration_minutes: 1,
            max_duration_minutes: 24 * 60,
            granularity_minutes: 1,
            day_end: TimeOfDay::saturating(TimeOfDay::LAST_MINUTE),
            require_known_references: false,
        }
    }

    pub fn check_start(&self, start: TimeOfDay) -> Result<(), ValidationError> {
        if start < self.earliest_start || start > self.latest_start {
            return Err(ValidationError::StartOutOfRange {
                start: start.to_string(),
                earliest: self.earliest_start.to_string(),
                latest: self.latest_start.to_string(),
            });
        }
        Ok(())
    }

    pub fn check_length(&self, length: SessionLength) -> Result<(), ValidationError> {
        let minutes = length.minutes();
        if minutes < self.min_duration_minutes || minutes > self.max_duration_minutes {
            return Err(ValidationError::DurationOutOfRange {
                minutes,
                min: self.min_duration_minutes,
                max: self.max_duration_minutes,
            });
        }
        if self.granularity_minutes > 1 && minutes % self.granularity_minutes != 0 {
            return Err(ValidationError::DurationGranularity {
                minutes,
                granularity: self.granularity_minutes,
            });
        }
        Ok(())
    }

    /// Full numeric check of a slot: start window, length limits, and the
    /// session ending no later than midnight.
    pub fn check_slot(&self, start: TimeOfDay, length: SessionLength) -> Result<(), ValidationError> {
        self.check_start(start)?;
        self.check_length(length)?;
        if Interval::new(start, length).end > 24 * 60 {
            return Err(ValidationError::PastMidnight {
                start: start.to_string(),
                minutes: length.minutes(),
            });
        }
        Ok(())
    }
}
