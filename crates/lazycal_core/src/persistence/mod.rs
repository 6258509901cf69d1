//! Persistence port and snapshot delivery.
//!
//! # Responsibility
//! - Define the load/save contract the core expects from storage adapters.
//! - Deliver snapshots after every mutation without blocking the caller.
//! - Report save outcomes back to the controller.
//!
//! # Invariants
//! - `save` always receives the full store, never a delta.
//! - A failed save never changes the in-memory store.
//! - Outcomes carry the submission sequence so callers can order them.
//!
//! # See also
//! - `crate::repo::event_repo` for the SQLite adapter.

use crate::db::DbError;
use crate::store::event_store::EventSnapshot;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod saver;

pub use memory::InMemoryPersistence;
pub use saver::BackgroundSaver;

pub type PersistResult<T> = Result<T, PersistError>;

/// Persistence adapter failure.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    /// Stored rows could not be turned back into valid events.
    InvalidData(String),
    /// Adapter or saver is not able to accept work.
    Unavailable(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::Unavailable(message) => write!(f, "persistence unavailable: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator that loads and saves whole snapshots.
pub trait EventPersistence {
    /// Returns the stored snapshot, or `None` when nothing was saved yet.
    fn load(&self) -> PersistResult<Option<EventSnapshot>>;
    /// Replaces stored content with `snapshot`.
    fn save(&self, snapshot: &EventSnapshot) -> PersistResult<()>;
}

/// Result of one submitted save.
#[derive(Debug)]
pub struct SaveOutcome {
    pub sequence: u64,
    pub result: PersistResult<()>,
}

/// Destination for post-mutation snapshots.
pub trait SnapshotSink {
    /// Hands off `snapshot` and returns its submission sequence.
    fn submit(&mut self, snapshot: EventSnapshot) -> u64;
    /// Drains outcomes produced since the previous call, without blocking.
    fn poll_outcomes(&mut self) -> Vec<SaveOutcome>;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn submit(&mut self, snapshot: EventSnapshot) -> u64 {
        (**self).submit(snapshot)
    }

    fn poll_outcomes(&mut self) -> Vec<SaveOutcome> {
        (**self).poll_outcomes()
    }
}

/// Sink that saves inline on the caller's thread.
///
/// Used where a worker thread is unwanted (tests, CLI tools).
pub struct SyncSink<P: EventPersistence> {
    port: P,
    next_sequence: u64,
    outcomes: Vec<SaveOutcome>,
}

impl<P: EventPersistence> SyncSink<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            next_sequence: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

impl<P: EventPersistence> SnapshotSink for SyncSink<P> {
    fn submit(&mut self, snapshot: EventSnapshot) -> u64 {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        let result = self.port.save(&snapshot);
        if let Err(err) = &result {
            warn!(
                "event=snapshot_save module=persistence status=error mode=sync sequence={sequence} error={err}"
            );
        }
        self.outcomes.push(SaveOutcome { sequence, result });
        sequence
    }

    fn poll_outcomes(&mut self) -> Vec<SaveOutcome> {
        std::mem::take(&mut self.outcomes)
    }
}

/// Sink for hosts whose storage could not be opened.
///
/// Every submission fails with `Unavailable`, so each mutation reports that
/// nothing was saved.
#[derive(Debug)]
pub struct UnavailableSink {
    reason: String,
    next_sequence: u64,
    outcomes: Vec<SaveOutcome>,
}

impl UnavailableSink {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            next_sequence: 0,
            outcomes: Vec::new(),
        }
    }
}

impl SnapshotSink for UnavailableSink {
    fn submit(&mut self, _snapshot: EventSnapshot) -> u64 {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        warn!(
            "event=snapshot_save module=persistence status=error mode=unavailable sequence={sequence}"
        );
        self.outcomes.push(SaveOutcome {
            sequence,
            result: Err(PersistError::Unavailable(self.reason.clone())),
        });
        sequence
    }

    fn poll_outcomes(&mut self) -> Vec<SaveOutcome> {
        std::mem::take(&mut self.outcomes)
    }
}

/// Sink that drops snapshots. For hosts without storage.
#[derive(Debug, Default)]
pub struct DiscardSink {
    next_sequence: u64,
}

impl SnapshotSink for DiscardSink {
    fn submit(&mut self, _snapshot: EventSnapshot) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn poll_outcomes(&mut self) -> Vec<SaveOutcome> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DiscardSink, InMemoryPersistence, PersistError, SnapshotSink, SyncSink, UnavailableSink,
    };
    use crate::store::event_store::EventSnapshot;

    #[test]
    fn unavailable_sink_fails_every_submission() {
        let mut sink = UnavailableSink::new("disk missing");
        assert_eq!(sink.submit(EventSnapshot::new()), 1);
        assert_eq!(sink.submit(EventSnapshot::new()), 2);

        let outcomes = sink.poll_outcomes();
        let sequences: Vec<u64> = outcomes.iter().map(|outcome| outcome.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert!(outcomes.iter().all(|outcome| matches!(
            &outcome.result,
            Err(PersistError::Unavailable(reason)) if reason == "disk missing"
        )));
        assert!(sink.poll_outcomes().is_empty());
    }

    #[test]
    fn boxed_sinks_delegate() {
        let port = InMemoryPersistence::new();
        let mut sinks: Vec<Box<dyn SnapshotSink>> = vec![
            Box::new(SyncSink::new(port.clone())),
            Box::new(DiscardSink::default()),
        ];
        for sink in sinks.iter_mut() {
            assert_eq!(sink.submit(EventSnapshot::new()), 1);
        }
        assert_eq!(sinks[0].poll_outcomes().len(), 1);
        assert!(sinks[1].poll_outcomes().is_empty());
        assert_eq!(port.save_count(), 1);
    }
}
