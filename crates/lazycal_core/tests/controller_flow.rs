use chrono::NaiveDate;
use lazycal_core::{
    ControllerError, DateRange, Dispatch, DotColor, Event, EventSnapshot, InMemoryPersistence,
    Intent, Mode, Notification, PickerOrigin, Priority, SchedulerController, SortMode, SyncSink,
};

fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn controller() -> (SchedulerController<SyncSink<InMemoryPersistence>>, InMemoryPersistence) {
    let port = InMemoryPersistence::new();
    let controller = SchedulerController::new(SyncSink::new(port.clone()), day("2024-04-30"));
    (controller, port)
}

fn add(
    controller: &mut SchedulerController<SyncSink<InMemoryPersistence>>,
    title: &str,
    hour24: u8,
    priority: Priority,
) {
    controller.dispatch(Intent::OpenAdd).unwrap();
    let draft = controller.edit_draft().unwrap();
    draft.set_title(title);
    draft.set_time(hour24, 0).unwrap();
    draft.set_priority(priority);
    controller.dispatch(Intent::Submit).unwrap();
}

#[test]
fn every_mutation_saves_the_full_store() {
    let (mut ctl, port) = controller();
    add(&mut ctl, "a", 9, Priority::Low);
    add(&mut ctl, "b", 10, Priority::Normal);
    assert_eq!(port.save_count(), 2);
    assert_eq!(port.stored().unwrap().event_count(), 2);

    ctl.open_edit(0).unwrap();
    ctl.request_delete().unwrap();
    ctl.confirm_delete().unwrap();
    assert_eq!(port.save_count(), 3);

    let stored = port.stored().unwrap();
    let titles: Vec<&str> = stored.events(day("2024-05-01")).iter().map(Event::title).collect();
    assert_eq!(titles, vec!["b"]);
    assert_eq!(ctl.poll_saves(), 3);
}

#[test]
fn edits_address_stored_slots_under_priority_sort() {
    let (mut ctl, _port) = controller();
    add(&mut ctl, "low", 8, Priority::Low);
    add(&mut ctl, "urgent", 9, Priority::Urgent);
    ctl.toggle_sort().unwrap();
    assert_eq!(ctl.sort_mode(), SortMode::Priority);

    let rows = ctl.day_view();
    assert_eq!(rows[0].event.title(), "urgent");
    assert_eq!(rows[0].slot, 1);

    ctl.open_edit(rows[0].slot).unwrap();
    assert_eq!(ctl.draft().title, "urgent");
    ctl.edit_draft().unwrap().set_title("urgent!");
    ctl.submit().unwrap();

    let stored: Vec<&str> = ctl
        .store()
        .get_events(day("2024-05-01"))
        .iter()
        .map(Event::title)
        .collect();
    assert_eq!(stored, vec!["low", "urgent!"]);
}

#[test]
fn notifications_are_emitted_in_order() {
    let (mut ctl, _port) = controller();
    ctl.hydrate(Some(EventSnapshot::from_buckets(vec![(
        day("2024-05-01"),
        vec![Event::new("seed", "", "07:00 AM", Priority::Normal).unwrap()],
    )])))
    .unwrap();
    add(&mut ctl, "new", 12, Priority::Low);
    ctl.open_edit(1).unwrap();
    ctl.submit().unwrap();
    ctl.open_edit(0).unwrap();
    ctl.request_delete().unwrap();
    ctl.confirm_delete().unwrap();

    let date = day("2024-05-01");
    assert_eq!(
        ctl.take_notifications(),
        vec![
            Notification::StoreLoaded { dates: 1 },
            Notification::EventAdded { date, slot: 1 },
            Notification::EventUpdated { date, slot: 1 },
            Notification::EventDeleted { date },
        ]
    );
    assert!(ctl.take_notifications().is_empty());
}

#[test]
fn failed_saves_are_reported_without_reverting_the_store() {
    let (mut ctl, port) = controller();
    port.set_fail_saves(true);
    add(&mut ctl, "kept", 9, Priority::Normal);

    assert_eq!(ctl.store().get_events(day("2024-05-01")).len(), 1);
    assert!(port.stored().is_none());

    ctl.take_notifications();
    assert_eq!(ctl.poll_saves(), 1);
    let notifications = ctl.take_notifications();
    assert!(matches!(
        notifications.as_slice(),
        [Notification::SaveFailed { sequence: 1, .. }]
    ));
}

#[test]
fn modals_are_mutually_exclusive() {
    let (mut ctl, _port) = controller();
    ctl.toggle_summary().unwrap();
    assert_eq!(ctl.mode(), Mode::ViewingSummary);
    assert!(matches!(
        ctl.open_add(),
        Err(ControllerError::InvalidTransition {
            state: "viewing_summary",
            intent: "open_add"
        })
    ));
    ctl.toggle_summary().unwrap();

    ctl.open_add().unwrap();
    assert!(ctl.toggle_summary().is_err());
    assert!(ctl.open_edit(0).is_err());
    assert_eq!(ctl.mode(), Mode::Adding);
}

#[test]
fn back_closes_modals_and_is_unhandled_when_idle() {
    let (mut ctl, _port) = controller();
    ctl.open_date_picker().unwrap();
    assert_eq!(ctl.mode(), Mode::SelectingDate(PickerOrigin::Idle));
    assert_eq!(ctl.back().unwrap(), Dispatch::Handled);
    assert_eq!(ctl.mode(), Mode::Idle);

    add(&mut ctl, "a", 9, Priority::Low);
    ctl.open_edit(0).unwrap();
    ctl.request_delete().unwrap();
    ctl.back().unwrap();
    assert_eq!(ctl.mode(), Mode::Editing(0));
    ctl.back().unwrap();
    assert_eq!(ctl.mode(), Mode::Idle);
    assert_eq!(ctl.back().unwrap(), Dispatch::Unhandled);
    assert!(ctl.cancel().is_err());
}

#[test]
fn selecting_a_date_moves_the_day_view() {
    let (mut ctl, _port) = controller();
    add(&mut ctl, "may", 9, Priority::Urgent);
    ctl.open_date_picker().unwrap();
    ctl.select_date(day("2024-06-02")).unwrap();
    assert_eq!(ctl.mode(), Mode::Idle);
    assert!(ctl.day_view().is_empty());

    let marks = ctl.month_marks(&DateRange::month(2024, 5).unwrap());
    assert_eq!(marks[&day("2024-05-01")].dot_colors, vec![DotColor::Urgent]);
    assert_eq!(ctl.summary().len(), 1);
}

#[test]
fn open_add_starts_from_a_cleared_draft() {
    let (mut ctl, _port) = controller();
    ctl.open_add().unwrap();
    ctl.edit_draft().unwrap().set_title("discarded");
    ctl.cancel().unwrap();
    ctl.open_add().unwrap();
    assert_eq!(ctl.draft().title, "");
    assert_eq!(ctl.draft().time().to_string(), "08:00 AM");
    assert_eq!(ctl.draft().priority, Priority::Low);
}
