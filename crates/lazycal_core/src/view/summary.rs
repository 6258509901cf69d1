//! Cross-date "view all" listing.
//!
//! # Responsibility
//! - Flatten the store into `(date, event)` pairs.
//! - Regroup pairs by date, preserving per-date event order.
//! - Produce the chronologically ordered summary shown by the list screen.
//!
//! # Invariants
//! - Every stored event appears exactly once in `flatten` output.
//! - Within a date, `sorted_summary` order equals bucket insertion order.

use crate::model::event::Event;
use crate::store::event_store::{DateKey, EventSnapshot};
use serde::Serialize;
use std::collections::HashMap;

const HEADING_FORMAT: &str = "%a, %b %-d, %Y";

/// One stored event tagged with its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedEvent {
    pub date: DateKey,
    pub event: Event,
}

/// All events of one date, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    pub date: DateKey,
    pub events: Vec<Event>,
}

/// Flattens the snapshot into one pair per stored event.
///
/// Bucket iteration order is not part of the contract; callers that need
/// chronological output use [`sorted_summary`].
pub fn flatten(snapshot: &EventSnapshot) -> Vec<DatedEvent> {
    snapshot
        .iter()
        .flat_map(|(date, events)| {
            events.iter().map(move |event| DatedEvent {
                date,
                event: event.clone(),
            })
        })
        .collect()
}

/// Groups pairs by date.
///
/// Groups appear in order of each date's first occurrence; events keep the
/// order they had in `flat`.
pub fn group_by_date(flat: Vec<DatedEvent>) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    let mut positions: HashMap<DateKey, usize> = HashMap::new();
    for DatedEvent { date, event } in flat {
        match positions.get(&date) {
            Some(&position) => groups[position].events.push(event),
            None => {
                positions.insert(date, groups.len());
                groups.push(DayGroup {
                    date,
                    events: vec![event],
                });
            }
        }
    }
    groups
}

/// Date-ascending summary of the whole store.
pub fn sorted_summary(snapshot: &EventSnapshot) -> Vec<DayGroup> {
    let mut flat = flatten(snapshot);
    // Stable: keeps insertion order inside each date.
    flat.sort_by_key(|item| item.date);
    group_by_date(flat)
}

/// Heading text for a summary date, e.g. `Wed, May 1, 2024`.
pub fn format_date_heading(date: DateKey) -> String {
    date.format(HEADING_FORMAT).to_string()
}
