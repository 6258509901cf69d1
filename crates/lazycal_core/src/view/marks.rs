//! Month-view day marks.
//!
//! # Responsibility
//! - Derive, per date, up to three priority-colored dots plus an overflow count.
//! - Restrict derivation to a calendar date range.
//!
//! # Invariants
//! - Dots follow bucket insertion order, never the presentation sort.
//! - `dot_colors.len() <= MAX_DOTS`; `overflow_count = len - MAX_DOTS` when larger.
//! - Dates without events are absent from `compute_marks` output.

use crate::model::event::{Event, Priority};
use crate::store::event_store::{DateKey, EventSnapshot};
use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Dots shown per day before the rest collapse into `+N`.
pub const MAX_DOTS: usize = 3;

/// Indicator color for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DotColor {
    Urgent,
    Normal,
    Low,
}

impl DotColor {
    /// Low and unrecognized priorities share the fallback color.
    pub fn for_priority(priority: &Priority) -> Self {
        match priority {
            Priority::Urgent => Self::Urgent,
            Priority::Normal => Self::Normal,
            Priority::Low | Priority::Unrecognized(_) => Self::Low,
        }
    }

    /// RGB hex used by the month view.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Urgent => "#FE5A1D",
            Self::Normal => "#F3D000",
            Self::Low => "#00B486",
        }
    }
}

/// Derived indicator set for one date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Mark {
    pub has_events: bool,
    pub dot_colors: Vec<DotColor>,
    pub overflow_count: usize,
}

impl Mark {
    /// Builds the mark for one bucket.
    pub fn for_events(events: &[Event]) -> Self {
        Self {
            has_events: !events.is_empty(),
            dot_colors: events
                .iter()
                .take(MAX_DOTS)
                .map(|event| DotColor::for_priority(event.priority()))
                .collect(),
            overflow_count: events.len().saturating_sub(MAX_DOTS),
        }
    }

    /// `+N` badge text, `None` when nothing overflows.
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow_count > 0).then(|| format!("+{}", self.overflow_count))
    }
}

/// Error for an inverted date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    Inverted { from: DateKey, to: DateKey },
    InvalidMonth { year: i32, month: u32 },
}

impl Display for DateRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inverted { from, to } => {
                write!(f, "date range start {from} is after end {to}")
            }
            Self::InvalidMonth { year, month } => write!(f, "invalid month {year}-{month}"),
        }
    }
}

impl Error for DateRangeError {}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: DateKey,
    to: DateKey,
}

impl DateRange {
    pub fn new(from: DateKey, to: DateKey) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    /// Range covering every day of `year-month`.
    pub fn month(year: i32, month: u32) -> Result<Self, DateRangeError> {
        let invalid = DateRangeError::InvalidMonth { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(invalid)?;
        Ok(Self {
            from: first,
            to: last,
        })
    }

    pub fn from(&self) -> DateKey {
        self.from
    }

    pub fn to(&self) -> DateKey {
        self.to
    }

    pub fn contains(&self, date: DateKey) -> bool {
        self.from <= date && date <= self.to
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = DateKey> {
        let to = self.to;
        self.from.iter_days().take_while(move |date| *date <= to)
    }
}

/// Marks for every date in `range` that has at least one event.
pub fn compute_marks(snapshot: &EventSnapshot, range: &DateRange) -> BTreeMap<DateKey, Mark> {
    snapshot
        .range(range.from, range.to)
        .map(|(date, events)| (date, Mark::for_events(events)))
        .collect()
}

/// Marks for every date in the store.
pub fn compute_all_marks(snapshot: &EventSnapshot) -> BTreeMap<DateKey, Mark> {
    snapshot
        .iter()
        .map(|(date, events)| (date, Mark::for_events(events)))
        .collect()
}

/// Looks up one date; dates without events get `has_events == false`.
pub fn mark_for(snapshot: &EventSnapshot, date: DateKey) -> Mark {
    Mark::for_events(snapshot.events(date))
}
