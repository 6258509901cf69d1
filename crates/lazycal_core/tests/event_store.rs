use chrono::NaiveDate;
use lazycal_core::{Event, EventSnapshot, EventStore, Priority, ScheduleError};

fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn event(title: &str) -> Event {
    Event::new(title, "", "09:00 AM", Priority::Normal).unwrap()
}

fn titles(events: &[Event]) -> Vec<&str> {
    events.iter().map(Event::title).collect()
}

#[test]
fn deleting_last_event_removes_the_date_key() {
    let mut store = EventStore::new();
    let date = day("2024-05-01");
    store.add_event(date, event("only"));
    store.delete_event(date, 0).unwrap();

    assert!(store.get_events(date).is_empty());
    assert!(!store.contains_date(date));
    assert!(store.dates().is_empty());
}

#[test]
fn update_preserves_other_slots() {
    let mut store = EventStore::new();
    let date = day("2024-05-01");
    for title in ["A", "B", "C"] {
        store.add_event(date, event(title));
    }

    let replaced = store.update_event(date, 1, event("B'")).unwrap();
    assert_eq!(replaced.title(), "B");
    assert_eq!(titles(store.get_events(date)), vec!["A", "B'", "C"]);
}

#[test]
fn add_returns_slot_in_insertion_order() {
    let mut store = EventStore::new();
    let date = day("2024-05-02");
    assert_eq!(store.add_event(date, event("first")), 0);
    assert_eq!(store.add_event(date, event("second")), 1);
    assert_eq!(titles(store.get_events(date)), vec!["first", "second"]);
}

#[test]
fn stale_indices_fail_with_index_out_of_range() {
    let mut store = EventStore::new();
    let date = day("2024-05-01");
    store.add_event(date, event("A"));

    assert_eq!(
        store.update_event(date, 1, event("x")).unwrap_err(),
        ScheduleError::IndexOutOfRange {
            date,
            index: 1,
            len: 1
        }
    );
    assert!(matches!(
        store.delete_event(day("2024-06-01"), 0),
        Err(ScheduleError::IndexOutOfRange { len: 0, .. })
    ));
    assert_eq!(titles(store.get_events(date)), vec!["A"]);
}

#[test]
fn bucket_query_distinguishes_missing_dates() {
    let store = EventStore::new();
    let date = day("2024-05-01");
    assert!(store.get_events(date).is_empty());
    assert_eq!(store.bucket(date).unwrap_err(), ScheduleError::KeyNotFound(date));
}

#[test]
fn load_replaces_content_without_merge() {
    let mut store = EventStore::new();
    store.add_event(day("2024-05-01"), event("old"));

    let snapshot = EventSnapshot::from_buckets(vec![(day("2024-05-09"), vec![event("new")])]);
    store.load(snapshot);

    assert!(!store.contains_date(day("2024-05-01")));
    assert_eq!(titles(store.get_events(day("2024-05-09"))), vec!["new"]);
}

#[test]
fn snapshots_do_not_observe_later_mutations() {
    let mut store = EventStore::new();
    let date = day("2024-05-01");
    store.add_event(date, event("A"));
    let frozen = store.snapshot();

    store.add_event(date, event("B"));
    store.delete_event(date, 0).unwrap();

    assert_eq!(titles(frozen.events(date)), vec!["A"]);
    assert_eq!(titles(store.get_events(date)), vec!["B"]);
}

#[test]
fn from_buckets_drops_empty_and_merges_repeated_dates() {
    let date = day("2024-05-01");
    let snapshot = EventSnapshot::from_buckets(vec![
        (date, vec![event("A")]),
        (day("2024-05-02"), Vec::new()),
        (date, vec![event("B")]),
    ]);
    assert_eq!(snapshot.date_count(), 1);
    assert_eq!(snapshot.event_count(), 2);
    assert_eq!(titles(snapshot.events(date)), vec!["A", "B"]);
}
