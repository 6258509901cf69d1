use chrono::NaiveDate;
use lazycal_core::{
    BackgroundSaver, Event, EventPersistence, EventStore, InMemoryPersistence, PersistError,
    Priority, SnapshotSink, SqliteEventPersistence,
};

fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn event(title: &str) -> Event {
    Event::new(title, "", "09:00 AM", Priority::Normal).unwrap()
}

#[test]
fn saves_run_in_submission_order() {
    let port = InMemoryPersistence::new();
    let mut saver = BackgroundSaver::spawn(port.clone()).unwrap();
    let mut store = EventStore::new();

    let mut sequences = Vec::new();
    for title in ["a", "b", "c"] {
        store.add_event(day("2024-05-01"), event(title));
        sequences.push(saver.submit(store.snapshot()));
    }
    assert_eq!(sequences, vec![1, 2, 3]);

    let outcomes = saver.flush();
    let done: Vec<u64> = outcomes.iter().map(|outcome| outcome.sequence).collect();
    assert_eq!(done, vec![1, 2, 3]);
    assert!(outcomes.iter().all(|outcome| outcome.result.is_ok()));
    assert_eq!(saver.in_flight(), 0);

    assert_eq!(port.save_count(), 3);
    assert_eq!(port.stored().unwrap(), store.snapshot());
}

#[test]
fn failures_come_back_as_outcomes() {
    let port = InMemoryPersistence::new();
    port.set_fail_saves(true);
    let mut saver = BackgroundSaver::spawn(port.clone()).unwrap();

    let sequence = saver.submit(EventStore::new().snapshot());
    let outcomes = saver.flush();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].sequence, sequence);
    assert!(matches!(outcomes[0].result, Err(PersistError::Unavailable(_))));
    assert!(saver.poll_outcomes().is_empty());
}

#[test]
fn dropping_the_saver_finishes_queued_work() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saver.sqlite3");
    let mut store = EventStore::new();
    store.add_event(day("2024-07-04"), event("fireworks"));

    {
        let port = SqliteEventPersistence::open(&path).unwrap();
        let mut saver = BackgroundSaver::spawn(port).unwrap();
        saver.submit(store.snapshot());
    }

    let reopened = SqliteEventPersistence::open(&path).unwrap();
    assert_eq!(reopened.load().unwrap().unwrap(), store.snapshot());
}
