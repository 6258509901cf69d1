//! Calendar scheduling core for LazyCal.
//! This crate is the single source of truth for scheduling invariants.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod store;
pub mod view;

pub use config::{ConfigError, CoreConfig};
pub use controller::{
    ControllerError, ControllerResult, Dispatch, Intent, Mode, Notification, PickerOrigin,
    SchedulerController, SlotView,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::draft::EventDraft;
pub use model::event::{Event, Priority};
pub use model::time::{Meridiem, ParsedTime, SortKey, TimeFormatError};
pub use persistence::{
    BackgroundSaver, DiscardSink, EventPersistence, InMemoryPersistence, PersistError,
    PersistResult, SaveOutcome, SnapshotSink, SyncSink, UnavailableSink,
};
pub use repo::event_repo::{SaveRecord, SqliteEventPersistence};
pub use store::error::{ScheduleError, ScheduleResult};
pub use store::event_store::{format_date_key, parse_date_key, DateKey, EventSnapshot, EventStore};
pub use view::marks::{compute_all_marks, compute_marks, DateRange, DateRangeError, DotColor, Mark};
pub use view::sort::{sort_by_priority, sort_by_time, sort_events, sort_slots, SortMode};
pub use view::summary::{format_date_heading, sorted_summary, DatedEvent, DayGroup};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
