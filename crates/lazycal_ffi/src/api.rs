//! FFI use-case API for Flutter-facing calendar calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level calendar functions to Dart via FRB.
//! - Own the process-wide scheduling session and its snapshot sink.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Errors are flattened into `message` strings.
//! - Every call drives `SchedulerController` intents; the session is back in
//!   `Idle` when a call returns.
//! - Every successful mutation hands one snapshot to the sink; the call
//!   never waits for the write.
//! - When storage could not be opened, every mutating response says that
//!   nothing was saved.
//! - Slots in requests and responses are stored bucket positions.

use chrono::Local;
use lazycal_core::{
    core_version as core_version_inner, format_date_heading, format_date_key,
    init_logging as init_logging_inner, parse_date_key, ping as ping_inner, BackgroundSaver,
    ControllerResult, CoreConfig, DateKey, DateRange, Event, EventPersistence, EventSnapshot,
    Mode, Notification, ParsedTime, Priority, ScheduleError, SchedulerController, SnapshotSink,
    SortMode, SqliteEventPersistence, UnavailableSink,
};
use log::{info, warn};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

type CalendarSession = SchedulerController<Box<dyn SnapshotSink + Send>>;

static CALENDAR: OnceLock<Mutex<CalendarSession>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One stored event as shown by the Flutter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    /// Stored position inside the date bucket.
    pub slot: u32,
    pub title: String,
    pub description: String,
    /// `HH:MM AM|PM`.
    pub time: String,
    /// `Urgent|normal|low` or the stored unrecognized label.
    pub priority: String,
    /// Title with the `No title` fallback applied.
    pub display_title: String,
    /// Description with the `Calendar event` fallback applied.
    pub display_description: String,
}

/// Result envelope for add/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarActionResponse {
    pub ok: bool,
    /// Slot the event occupies after add/update.
    pub slot: Option<u32>,
    pub message: String,
}

impl CalendarActionResponse {
    fn success(message: impl Into<String>, slot: Option<usize>) -> Self {
        Self {
            ok: true,
            slot: slot.map(slot_to_ffi),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            slot: None,
            message: message.into(),
        }
    }
}

/// Day list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayResponse {
    pub date: String,
    /// Effective sort mode (`time|priority`).
    pub sort_mode: String,
    pub items: Vec<CalendarEventItem>,
    pub message: String,
}

/// Month-view indicators for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMarkItem {
    pub date: String,
    /// Hex colors, at most three, in insertion order.
    pub dot_colors: Vec<String>,
    pub overflow_count: u32,
    /// `+N` when more events exist than dots.
    pub overflow_label: Option<String>,
}

/// One heading group of the "view all" screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSummaryDay {
    pub date: String,
    /// e.g. `Wed, May 1, 2024`.
    pub heading: String,
    pub items: Vec<CalendarEventItem>,
}

/// Adds an event to the bucket of `date`.
///
/// # FFI contract
/// - Sync call; persistence happens on a background thread.
/// - Never panics.
/// - Returns the new slot on success.
/// - `title` and `description` are stored verbatim.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_add_event(
    date: String,
    title: String,
    description: String,
    time: String,
    priority: String,
) -> CalendarActionResponse {
    const OPERATION: &str = "calendar_add_event";
    let request = match EventRequest::parse(&date, title, description, &time, &priority) {
        Ok(request) => request,
        Err(err) => return CalendarActionResponse::failure(format!("{OPERATION} failed: {err}")),
    };
    with_calendar(OPERATION, |session| add_event(session, request))
}

/// Replaces the event stored at `slot` of `date`.
///
/// # FFI contract
/// - Never panics.
/// - Fails when the slot does not exist; other slots are untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_update_event(
    date: String,
    slot: u32,
    title: String,
    description: String,
    time: String,
    priority: String,
) -> CalendarActionResponse {
    const OPERATION: &str = "calendar_update_event";
    let request = match EventRequest::parse(&date, title, description, &time, &priority) {
        Ok(request) => request,
        Err(err) => return CalendarActionResponse::failure(format!("{OPERATION} failed: {err}")),
    };
    with_calendar(OPERATION, |session| {
        update_event(session, slot as usize, request)
    })
}

/// Deletes the event stored at `slot` of `date`.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_delete_event(date: String, slot: u32) -> CalendarActionResponse {
    const OPERATION: &str = "calendar_delete_event";
    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(err) => return CalendarActionResponse::failure(format!("{OPERATION} failed: {err}")),
    };
    with_calendar(OPERATION, |session| {
        delete_event(session, date, slot as usize)
    })
}

/// Lists the events of `date` in presentation order.
///
/// `sort_mode` is `time` or `priority`; anything else falls back to `time`.
/// The date becomes the session's active date.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_day_events(date: String, sort_mode: String) -> CalendarDayResponse {
    const OPERATION: &str = "calendar_day_events";
    let mode = SortMode::from_label(&sort_mode).unwrap_or_default();
    let failure = |message: String| CalendarDayResponse {
        date: date.trim().to_string(),
        sort_mode: mode.as_str().to_string(),
        items: Vec::new(),
        message,
    };

    let key = match parse_date(&date) {
        Ok(key) => key,
        Err(err) => return failure(format!("{OPERATION} failed: {err}")),
    };
    match lock_calendar() {
        Ok(mut session) => day_events(&mut *session, key, mode),
        Err(err) => failure(format!("{OPERATION} failed: {err}")),
    }
}

/// Marks for every date of the given month that has events.
///
/// Returns an empty list for an invalid month.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_month_marks(year: i32, month: u32) -> Vec<CalendarMarkItem> {
    let range = match DateRange::month(year, month) {
        Ok(range) => range,
        Err(err) => {
            warn!("event=calendar_month_marks module=ffi status=error error={err}");
            return Vec::new();
        }
    };
    match lock_calendar() {
        Ok(session) => month_marks(&*session, &range),
        Err(err) => {
            warn!("event=calendar_month_marks module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

/// Date-ascending listing of every stored event.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_summary() -> Vec<CalendarSummaryDay> {
    match lock_calendar() {
        Ok(session) => summary(&*session),
        Err(err) => {
            warn!("event=calendar_summary module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

/// Validated form input shared by add and update.
struct EventRequest {
    date: DateKey,
    title: String,
    description: String,
    time: ParsedTime,
    priority: Priority,
}

impl EventRequest {
    fn parse(
        date: &str,
        title: String,
        description: String,
        time: &str,
        priority: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            date: parse_date(date)?,
            title,
            description,
            time: time.trim().parse::<ParsedTime>().map_err(|err| err.to_string())?,
            priority: Priority::from_label(priority.trim()),
        })
    }
}

fn add_event<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    request: EventRequest,
) -> CalendarActionResponse {
    run_mutation(session, "calendar_add_event", |session| {
        go_to_date(session, request.date)?;
        session.open_add()?;
        fill_draft(session, request)?;
        session.submit()?;
        Ok(())
    })
}

fn update_event<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    slot: usize,
    request: EventRequest,
) -> CalendarActionResponse {
    run_mutation(session, "calendar_update_event", |session| {
        go_to_date(session, request.date)?;
        session.open_edit(slot)?;
        fill_draft(session, request)?;
        session.submit()?;
        Ok(())
    })
}

fn delete_event<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    date: DateKey,
    slot: usize,
) -> CalendarActionResponse {
    run_mutation(session, "calendar_delete_event", |session| {
        go_to_date(session, date)?;
        session.open_edit(slot)?;
        session.request_delete()?;
        session.confirm_delete()?;
        Ok(())
    })
}

fn day_events<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    date: DateKey,
    mode: SortMode,
) -> CalendarDayResponse {
    return_to_idle(session);
    let selected = go_to_date(session, date).and_then(|()| {
        if session.sort_mode() != mode {
            session.toggle_sort()?;
        }
        Ok(())
    });
    if selected.is_err() {
        return_to_idle(session);
    }
    let drained = drain(session);

    let (items, message) = match selected {
        Ok(()) => {
            let items = session
                .day_view()
                .iter()
                .map(|view| to_event_item(view.slot, &view.event))
                .collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No events.".to_string()
            } else {
                format!("Found {} event(s).", items.len())
            };
            (items, message)
        }
        Err(err) => (Vec::new(), format!("calendar_day_events failed: {err}")),
    };
    CalendarDayResponse {
        date: format_date_key(date),
        sort_mode: session.sort_mode().as_str().to_string(),
        items,
        message: with_notes(message, drained.notes),
    }
}

fn month_marks<S: SnapshotSink>(
    session: &SchedulerController<S>,
    range: &DateRange,
) -> Vec<CalendarMarkItem> {
    session
        .month_marks(range)
        .into_iter()
        .map(|(date, mark)| CalendarMarkItem {
            date: format_date_key(date),
            dot_colors: mark
                .dot_colors
                .iter()
                .map(|color| color.hex().to_string())
                .collect(),
            overflow_count: slot_to_ffi(mark.overflow_count),
            overflow_label: mark.overflow_label(),
        })
        .collect()
}

fn summary<S: SnapshotSink>(session: &SchedulerController<S>) -> Vec<CalendarSummaryDay> {
    session
        .summary()
        .into_iter()
        .map(|group| CalendarSummaryDay {
            date: format_date_key(group.date),
            heading: format_date_heading(group.date),
            // Groups keep bucket order, so the position is the stored slot.
            items: group
                .events
                .iter()
                .enumerate()
                .map(|(slot, event)| to_event_item(slot, event))
                .collect(),
        })
        .collect()
}

/// Runs one intent sequence and turns the session outbox into a response.
fn run_mutation<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    operation: &'static str,
    steps: impl FnOnce(&mut SchedulerController<S>) -> ControllerResult<()>,
) -> CalendarActionResponse {
    return_to_idle(session);
    let result = steps(session);
    if result.is_err() {
        return_to_idle(session);
    }
    let drained = drain(session);
    match result {
        Ok(()) => CalendarActionResponse::success(
            with_notes(drained.messages.join(" "), drained.notes),
            drained.slot,
        ),
        Err(err) => {
            warn!("event={operation} module=ffi status=error error={err}");
            CalendarActionResponse::failure(with_notes(
                format!("{operation} failed: {err}"),
                drained.notes,
            ))
        }
    }
}

fn go_to_date<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    date: DateKey,
) -> ControllerResult<()> {
    session.open_date_picker()?;
    session.select_date(date)?;
    Ok(())
}

fn fill_draft<S: SnapshotSink>(
    session: &mut SchedulerController<S>,
    request: EventRequest,
) -> ControllerResult<()> {
    let key = request.time.sort_key();
    let draft = session.edit_draft()?;
    draft.set_title(request.title);
    draft.set_description(request.description);
    draft.set_priority(request.priority);
    draft
        .set_time(key.hour24, key.minute)
        .map_err(ScheduleError::from)?;
    Ok(())
}

/// Backs out of any open form or picker.
fn return_to_idle<S: SnapshotSink>(session: &mut SchedulerController<S>) {
    while session.mode() != Mode::Idle {
        if session.back().is_err() {
            break;
        }
    }
}

#[derive(Default)]
struct Drained {
    messages: Vec<String>,
    slot: Option<usize>,
    notes: Vec<String>,
}

fn drain<S: SnapshotSink>(session: &mut SchedulerController<S>) -> Drained {
    session.poll_saves();
    let mut drained = Drained::default();
    for notification in session.take_notifications() {
        match notification {
            Notification::EventAdded { slot, .. } => {
                drained.messages.push("Event added.".to_string());
                drained.slot = Some(slot);
            }
            Notification::EventUpdated { slot, .. } => {
                drained.messages.push("Event updated.".to_string());
                drained.slot = Some(slot);
            }
            Notification::EventDeleted { .. } => {
                drained
                    .messages
                    .push("Event deleted successfully!".to_string());
            }
            Notification::StoreLoaded { dates } => {
                info!("event=calendar_hydrate module=ffi status=ok dates={dates}");
            }
            Notification::SaveFailed { sequence, message } => {
                drained
                    .notes
                    .push(format!("save #{sequence} failed: {message}"));
            }
        }
    }
    drained
}

/// Opens the SQLite store at `db_path`, or a session that saves nothing.
fn open_session(db_path: &Path, today: DateKey) -> CalendarSession {
    match open_saver(db_path) {
        Ok((snapshot, saver)) => start_session(Box::new(saver), snapshot, today),
        Err(reason) => unavailable_session(reason, today),
    }
}

fn unavailable_session(reason: String, today: DateKey) -> CalendarSession {
    warn!("event=calendar_hydrate module=ffi status=error error={reason}");
    start_session(Box::new(UnavailableSink::new(reason)), None, today)
}

fn start_session(
    sink: Box<dyn SnapshotSink + Send>,
    snapshot: Option<EventSnapshot>,
    today: DateKey,
) -> CalendarSession {
    let mut session = SchedulerController::new(sink, today);
    if let Err(err) = session.hydrate(snapshot) {
        warn!("event=calendar_hydrate module=ffi status=error error={err}");
    }
    session
}

fn session_from_env() -> CalendarSession {
    let today = Local::now().date_naive();
    match CoreConfig::from_env() {
        Ok(config) => open_session(&config.db_path, today),
        Err(err) => unavailable_session(format!("config invalid: {err}"), today),
    }
}

fn open_saver(db_path: &Path) -> Result<(Option<EventSnapshot>, BackgroundSaver), String> {
    let port = SqliteEventPersistence::open(db_path)
        .map_err(|err| format!("calendar DB open failed: {err}"))?;
    let snapshot = port
        .load()
        .map_err(|err| format!("calendar DB load failed: {err}"))?;
    let saver = BackgroundSaver::spawn(port).map_err(|err| err.to_string())?;
    Ok((snapshot, saver))
}

fn lock_calendar() -> Result<std::sync::MutexGuard<'static, CalendarSession>, String> {
    CALENDAR
        .get_or_init(|| Mutex::new(session_from_env()))
        .lock()
        .map_err(|_| "calendar state lock poisoned".to_string())
}

fn with_calendar(
    operation: &'static str,
    f: impl FnOnce(&mut CalendarSession) -> CalendarActionResponse,
) -> CalendarActionResponse {
    match lock_calendar() {
        Ok(mut session) => f(&mut session),
        Err(err) => CalendarActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn parse_date(text: &str) -> Result<DateKey, String> {
    parse_date_key(text).map_err(|err| format!("invalid date `{}`: {err}", text.trim()))
}

fn to_event_item(slot: usize, event: &Event) -> CalendarEventItem {
    CalendarEventItem {
        slot: slot_to_ffi(slot),
        title: event.title().to_string(),
        description: event.description().to_string(),
        time: event.time().to_string(),
        priority: event.priority().label().to_string(),
        display_title: event.display_title().to_string(),
        display_description: event.display_description().to_string(),
    }
}

fn with_notes(message: impl Into<String>, notes: Vec<String>) -> String {
    let message = message.into();
    if notes.is_empty() {
        message
    } else {
        format!("{message} ({})", notes.join("; "))
    }
}

fn slot_to_ffi(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
