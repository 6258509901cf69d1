//! In-memory event store keyed by calendar date.
//!
//! # Responsibility
//! - Own every `Event` record, grouped into per-date buckets.
//! - Provide add/update/delete/load with slot-index addressing.
//! - Hand out immutable snapshots for derivations and persistence.
//!
//! # Invariants
//! - A date key exists if and only if its bucket is non-empty.
//! - Bucket order is insertion order; no operation reorders a bucket.
//! - Snapshots never observe later mutations (copy-on-write via `Arc`).
//!
//! # See also
//! - `crate::view` for the read-only derivations over snapshots.

use crate::model::event::Event;
use crate::store::error::{ScheduleError, ScheduleResult};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Calendar date used as bucket key. Serialized as `YYYY-MM-DD`.
pub type DateKey = NaiveDate;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`) into a bucket key.
pub fn parse_date_key(text: &str) -> Result<DateKey, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), DATE_KEY_FORMAT)
}

/// Formats a bucket key as `YYYY-MM-DD`.
pub fn format_date_key(date: DateKey) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Immutable, cheaply clonable view of the whole store.
///
/// Dates iterate in ascending order. Serialized as a JSON object mapping ISO
/// date strings to event arrays; empty arrays are dropped on deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSnapshot {
    buckets: Arc<BTreeMap<DateKey, Vec<Event>>>,
}

impl EventSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from `(date, events)` pairs.
    ///
    /// Repeated dates are concatenated in iteration order; empty buckets are
    /// discarded so the key/non-empty invariant holds.
    pub fn from_buckets(buckets: impl IntoIterator<Item = (DateKey, Vec<Event>)>) -> Self {
        let mut map: BTreeMap<DateKey, Vec<Event>> = BTreeMap::new();
        for (date, events) in buckets {
            if events.is_empty() {
                continue;
            }
            map.entry(date).or_default().extend(events);
        }
        Self {
            buckets: Arc::new(map),
        }
    }

    /// Returns the bucket for `date`, empty when absent.
    pub fn events(&self, date: DateKey) -> &[Event] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_date(&self, date: DateKey) -> bool {
        self.buckets.contains_key(&date)
    }

    /// Dates with at least one event, ascending.
    pub fn dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.buckets.keys().copied()
    }

    /// `(date, bucket)` pairs, ascending by date.
    pub fn iter(&self) -> impl Iterator<Item = (DateKey, &[Event])> + '_ {
        self.buckets
            .iter()
            .map(|(date, events)| (*date, events.as_slice()))
    }

    /// `(date, bucket)` pairs within `from..=to`, ascending by date.
    pub fn range(
        &self,
        from: DateKey,
        to: DateKey,
    ) -> impl Iterator<Item = (DateKey, &[Event])> + '_ {
        self.buckets
            .range(from..=to)
            .map(|(date, events)| (*date, events.as_slice()))
    }

    pub fn date_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn event_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Serialize for EventSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.buckets.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let buckets = BTreeMap::<DateKey, Vec<Event>>::deserialize(deserializer)?;
        Ok(Self::from_buckets(buckets))
    }
}

/// Mutable owner of all scheduled events.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    current: EventSnapshot,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: EventSnapshot) -> Self {
        Self { current: snapshot }
    }

    /// Appends `event` to the bucket for `date`, creating the bucket if needed.
    ///
    /// Returns the slot index the event now occupies.
    pub fn add_event(&mut self, date: DateKey, event: Event) -> usize {
        let bucket = self.buckets_mut().entry(date).or_default();
        bucket.push(event);
        let slot = bucket.len() - 1;
        debug!("event=event_add module=store status=ok date={date} slot={slot}");
        slot
    }

    /// Replaces the event at `index` in the bucket for `date`.
    ///
    /// Returns the replaced record.
    ///
    /// # Errors
    /// - `IndexOutOfRange` when the date has no bucket or `index` is past its end.
    pub fn update_event(
        &mut self,
        date: DateKey,
        index: usize,
        event: Event,
    ) -> ScheduleResult<Event> {
        self.ensure_slot(date, index)?;
        let bucket = self
            .buckets_mut()
            .get_mut(&date)
            .ok_or(ScheduleError::IndexOutOfRange {
                date,
                index,
                len: 0,
            })?;
        let previous = std::mem::replace(&mut bucket[index], event);
        debug!("event=event_update module=store status=ok date={date} slot={index}");
        Ok(previous)
    }

    /// Removes the event at `index`; drops the date key when the bucket empties.
    ///
    /// Returns the removed record.
    ///
    /// # Errors
    /// - `IndexOutOfRange` when the date has no bucket or `index` is past its end.
    pub fn delete_event(&mut self, date: DateKey, index: usize) -> ScheduleResult<Event> {
        self.ensure_slot(date, index)?;
        let buckets = self.buckets_mut();
        let bucket = buckets
            .get_mut(&date)
            .ok_or(ScheduleError::IndexOutOfRange {
                date,
                index,
                len: 0,
            })?;
        let removed = bucket.remove(index);
        let remaining = bucket.len();
        if remaining == 0 {
            buckets.remove(&date);
        }
        debug!(
            "event=event_delete module=store status=ok date={date} slot={index} remaining={remaining}"
        );
        Ok(removed)
    }

    /// Returns the bucket for `date` in insertion order; empty when absent.
    pub fn get_events(&self, date: DateKey) -> &[Event] {
        self.current.events(date)
    }

    /// Returns the bucket for `date`, failing when the caller expected one.
    ///
    /// # Errors
    /// - `KeyNotFound` when no event is scheduled on `date`.
    pub fn bucket(&self, date: DateKey) -> ScheduleResult<&[Event]> {
        if !self.current.contains_date(date) {
            return Err(ScheduleError::KeyNotFound(date));
        }
        Ok(self.current.events(date))
    }

    /// Returns one event by slot.
    ///
    /// # Errors
    /// - `IndexOutOfRange` under the same conditions as `update_event`.
    pub fn event_at(&self, date: DateKey, index: usize) -> ScheduleResult<&Event> {
        let events = self.current.events(date);
        events.get(index).ok_or(ScheduleError::IndexOutOfRange {
            date,
            index,
            len: events.len(),
        })
    }

    /// Replaces the whole store. No merge with previous content.
    pub fn load(&mut self, snapshot: EventSnapshot) {
        debug!(
            "event=store_load module=store status=ok dates={} events={}",
            snapshot.date_count(),
            snapshot.event_count()
        );
        self.current = snapshot;
    }

    /// Returns a frozen view of the current content.
    pub fn snapshot(&self) -> EventSnapshot {
        self.current.clone()
    }

    /// Borrows the current content without cloning.
    pub fn view(&self) -> &EventSnapshot {
        &self.current
    }

    pub fn contains_date(&self, date: DateKey) -> bool {
        self.current.contains_date(date)
    }

    pub fn dates(&self) -> Vec<DateKey> {
        self.current.dates().collect()
    }

    fn ensure_slot(&self, date: DateKey, index: usize) -> ScheduleResult<()> {
        self.event_at(date, index).map(|_| ())
    }

    fn buckets_mut(&mut self) -> &mut BTreeMap<DateKey, Vec<Event>> {
        Arc::make_mut(&mut self.current.buckets)
    }
}
