//! Scheduling error kinds surfaced to callers.

use crate::model::time::TimeFormatError;
use crate::store::event_store::DateKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors returned by store and codec operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Malformed clock text.
    Format(TimeFormatError),
    /// Slot index is stale/invalid, or the date has no bucket.
    IndexOutOfRange {
        date: DateKey,
        index: usize,
        len: usize,
    },
    /// Caller expected a bucket for this date.
    KeyNotFound(DateKey),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "{err}"),
            Self::IndexOutOfRange { date, index, len } => write!(
                f,
                "event index {index} out of range for {date} (bucket holds {len})"
            ),
            Self::KeyNotFound(date) => write!(f, "no events scheduled on {date}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            Self::IndexOutOfRange { .. } | Self::KeyNotFound(_) => None,
        }
    }
}

impl From<TimeFormatError> for ScheduleError {
    fn from(value: TimeFormatError) -> Self {
        Self::Format(value)
    }
}
