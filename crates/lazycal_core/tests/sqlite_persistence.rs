use chrono::NaiveDate;
use lazycal_core::{
    Event, EventPersistence, EventSnapshot, EventStore, PersistError, Priority,
    SqliteEventPersistence,
};

fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn sample_snapshot() -> EventSnapshot {
    let mut store = EventStore::new();
    store.add_event(
        day("2024-05-02"),
        Event::new("second", "b", "11:15 PM", Priority::Urgent).unwrap(),
    );
    store.add_event(
        day("2024-05-01"),
        Event::new("first", "", "08:00 AM", Priority::Normal).unwrap(),
    );
    store.add_event(
        day("2024-05-01"),
        Event::new("custom", "kept", "07:00 AM", Priority::from_label("someday")).unwrap(),
    );
    store.snapshot()
}

#[test]
fn load_returns_none_before_first_save() {
    let port = SqliteEventPersistence::open_in_memory().unwrap();
    assert!(port.load().unwrap().is_none());
    assert!(port.last_save().unwrap().is_none());
}

#[test]
fn save_then_load_restores_buckets_in_order() {
    let port = SqliteEventPersistence::open_in_memory().unwrap();
    let snapshot = sample_snapshot();
    port.save(&snapshot).unwrap();

    let loaded = port.load().unwrap().unwrap();
    assert_eq!(loaded, snapshot);
    let titles: Vec<&str> = loaded.events(day("2024-05-01")).iter().map(Event::title).collect();
    assert_eq!(titles, vec!["first", "custom"]);
    assert_eq!(
        loaded.events(day("2024-05-01"))[1].priority(),
        &Priority::Unrecognized("someday".to_string())
    );

    let record = port.last_save().unwrap().unwrap();
    assert_eq!(record.date_count, 2);
    assert_eq!(record.event_count, 3);
}

#[test]
fn save_replaces_previous_content() {
    let port = SqliteEventPersistence::open_in_memory().unwrap();
    port.save(&sample_snapshot()).unwrap();

    let smaller = EventSnapshot::from_buckets(vec![(
        day("2024-06-01"),
        vec![Event::new("only", "", "09:00 AM", Priority::Low).unwrap()],
    )]);
    port.save(&smaller).unwrap();
    assert_eq!(port.load().unwrap().unwrap(), smaller);

    // An emptied store loads back as empty, not as "never saved".
    port.save(&EventSnapshot::new()).unwrap();
    let loaded = port.load().unwrap().unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn data_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lazycal.sqlite3");

    let snapshot = sample_snapshot();
    SqliteEventPersistence::open(&path)
        .unwrap()
        .save(&snapshot)
        .unwrap();

    let reopened = SqliteEventPersistence::open(&path).unwrap();
    assert_eq!(reopened.load().unwrap().unwrap(), snapshot);
}

#[test]
fn invalid_rows_are_reported_not_masked() {
    let port = SqliteEventPersistence::open_in_memory().unwrap();
    port.connection()
        .execute_batch(
            "INSERT INTO events (event_date, slot, title, description, event_time, priority)
             VALUES ('2024-05-01', 0, 't', '', '8 o''clock', 'low');",
        )
        .unwrap();
    assert!(matches!(port.load(), Err(PersistError::InvalidData(_))));

    port.connection()
        .execute_batch(
            "DELETE FROM events;
             INSERT INTO events (event_date, slot, title, description, event_time, priority)
             VALUES ('May 1st', 0, 't', '', '08:00 AM', 'low');",
        )
        .unwrap();
    let error = port.load().unwrap_err();
    assert!(error.to_string().contains("May 1st"));
}
