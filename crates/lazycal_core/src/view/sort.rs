//! Presentation ordering for one day's events.
//!
//! # Invariants
//! - Sorting is stable: ties keep insertion order.
//! - Inputs are never reordered; callers get a new sequence.
//! - Unknown priorities rank with `low`.

use crate::model::event::Event;
use serde::{Deserialize, Serialize};

/// Ordering applied to a day list. Toggled by the UI, never stored per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Time,
    Priority,
}

impl SortMode {
    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Time => Self::Priority,
            Self::Priority => Self::Time,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Priority => "priority",
        }
    }

    /// Parses `time`/`priority` (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "time" => Some(Self::Time),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Stable sort by 24-hour time, earliest first.
pub fn sort_by_time(events: &[Event]) -> Vec<Event> {
    sort_events(events, SortMode::Time)
}

/// Stable sort by priority rank, Urgent first.
pub fn sort_by_priority(events: &[Event]) -> Vec<Event> {
    sort_events(events, SortMode::Priority)
}

/// Returns a reordered copy of `events` for the given mode.
pub fn sort_events(events: &[Event], mode: SortMode) -> Vec<Event> {
    sort_slots(events, mode)
        .into_iter()
        .map(|(_, event)| event.clone())
        .collect()
}

/// Returns `(stored slot, event)` pairs in presentation order.
///
/// The slot is the event's index in the stored bucket, which is what
/// update/delete address regardless of the order rows are shown in.
pub fn sort_slots(events: &[Event], mode: SortMode) -> Vec<(usize, &Event)> {
    let mut slots: Vec<(usize, &Event)> = events.iter().enumerate().collect();
    match mode {
        SortMode::Time => slots.sort_by_key(|(_, event)| event.time().sort_key()),
        SortMode::Priority => slots.sort_by_key(|(_, event)| event.priority().rank()),
    }
    slots
}
