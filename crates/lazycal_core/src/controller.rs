//! Scheduling session state machine.
//!
//! # Responsibility
//! - Track which modal is active and route user intents to the store.
//! - Hand a snapshot to the sink after every mutation.
//! - Queue outcome notifications for the host to drain.
//!
//! # Invariants
//! - Exactly one `Mode` is active; modals are mutually exclusive.
//! - A rejected intent leaves mode, draft and store untouched.
//! - Save failures are reported but never revert the store.
//! - Edits and deletes address stored slots, not presentation rows.

use crate::model::draft::EventDraft;
use crate::model::event::Event;
use crate::persistence::SnapshotSink;
use crate::store::error::ScheduleError;
use crate::store::event_store::{DateKey, EventSnapshot, EventStore};
use crate::view::marks::{compute_marks, DateRange, Mark};
use crate::view::sort::{sort_slots, SortMode};
use crate::view::summary::{sorted_summary, DayGroup};
use chrono::Days;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ControllerResult<T> = Result<T, ControllerError>;

/// State the date picker returns to when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOrigin {
    Idle,
    Adding,
}

impl PickerOrigin {
    fn mode(self) -> Mode {
        match self {
            Self::Idle => Mode::Idle,
            Self::Adding => Mode::Adding,
        }
    }
}

/// Active screen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Adding,
    Editing(usize),
    SelectingDate(PickerOrigin),
    ConfirmingDelete(usize),
    ViewingSummary,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Adding => "adding",
            Self::Editing(_) => "editing",
            Self::SelectingDate(_) => "selecting_date",
            Self::ConfirmingDelete(_) => "confirming_delete",
            Self::ViewingSummary => "viewing_summary",
        }
    }
}

/// User input routed through [`SchedulerController::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    OpenAdd,
    /// Opens the edit form for a stored slot of the active date.
    OpenEdit(usize),
    Submit,
    Cancel,
    RequestDelete,
    ConfirmDelete,
    OpenDatePicker,
    SelectDate(DateKey),
    ToggleSummary,
    ToggleSort,
    /// Hardware back button.
    Back,
}

impl Intent {
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAdd => "open_add",
            Self::OpenEdit(_) => "open_edit",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::RequestDelete => "request_delete",
            Self::ConfirmDelete => "confirm_delete",
            Self::OpenDatePicker => "open_date_picker",
            Self::SelectDate(_) => "select_date",
            Self::ToggleSummary => "toggle_summary",
            Self::ToggleSort => "toggle_sort",
            Self::Back => "back",
        }
    }
}

/// Whether the controller consumed an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// Nothing to close; the host may apply its own default (e.g. exit).
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    InvalidTransition {
        state: &'static str,
        intent: &'static str,
    },
    Schedule(ScheduleError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { state, intent } => {
                write!(f, "intent `{intent}` is not allowed while {state}")
            }
            Self::Schedule(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTransition { .. } => None,
            Self::Schedule(err) => Some(err),
        }
    }
}

impl From<ScheduleError> for ControllerError {
    fn from(value: ScheduleError) -> Self {
        Self::Schedule(value)
    }
}

/// Outcome messages for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    EventAdded { date: DateKey, slot: usize },
    EventUpdated { date: DateKey, slot: usize },
    EventDeleted { date: DateKey },
    StoreLoaded { dates: usize },
    SaveFailed { sequence: u64, message: String },
}

/// One row of the day list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    /// Stored position of `event` in its bucket.
    pub slot: usize,
    pub event: Event,
}

/// Single-caller scheduling session.
pub struct SchedulerController<S: SnapshotSink> {
    store: EventStore,
    active_date: DateKey,
    sort_mode: SortMode,
    mode: Mode,
    draft: EventDraft,
    outbox: Vec<Notification>,
    sink: S,
}

impl<S: SnapshotSink> SchedulerController<S> {
    /// Starts an empty session whose active date is the day after `today`.
    pub fn new(sink: S, today: DateKey) -> Self {
        let active_date = today.checked_add_days(Days::new(1)).unwrap_or(today);
        Self {
            store: EventStore::new(),
            active_date,
            sort_mode: SortMode::default(),
            mode: Mode::Idle,
            draft: EventDraft::default(),
            outbox: Vec::new(),
            sink,
        }
    }

    /// Replaces the store with what the persistence port returned.
    ///
    /// # Errors
    /// - `InvalidTransition` outside `Idle`, so an open form never writes a
    ///   stale draft over the loaded content.
    pub fn hydrate(&mut self, snapshot: Option<EventSnapshot>) -> ControllerResult<()> {
        if self.mode != Mode::Idle {
            warn!(
                "event=store_hydrate module=controller status=error state={}",
                self.mode.name()
            );
            return Err(ControllerError::InvalidTransition {
                state: self.mode.name(),
                intent: "hydrate",
            });
        }
        let snapshot = snapshot.unwrap_or_default();
        let dates = snapshot.date_count();
        self.store.load(snapshot);
        self.outbox.push(Notification::StoreLoaded { dates });
        self.persist();
        Ok(())
    }

    /// Applies one intent.
    ///
    /// # Errors
    /// - `InvalidTransition` when `intent` is not accepted in the current mode.
    /// - `Schedule` when the store rejects the addressed slot.
    pub fn dispatch(&mut self, intent: Intent) -> ControllerResult<Dispatch> {
        let from = self.mode;
        let result = self.apply(intent);
        match &result {
            Ok(Dispatch::Handled) => debug!(
                "event=controller_dispatch module=controller status=ok intent={} from={} to={}",
                intent.name(),
                from.name(),
                self.mode.name()
            ),
            Ok(Dispatch::Unhandled) => debug!(
                "event=controller_dispatch module=controller status=unhandled intent={} state={}",
                intent.name(),
                from.name()
            ),
            Err(err) => warn!(
                "event=controller_dispatch module=controller status=error intent={} state={} error={}",
                intent.name(),
                from.name(),
                err
            ),
        }
        result
    }

    fn apply(&mut self, intent: Intent) -> ControllerResult<Dispatch> {
        match (self.mode, intent) {
            (_, Intent::ToggleSort) => {
                self.sort_mode = self.sort_mode.toggled();
            }
            (Mode::Idle, Intent::OpenAdd) => {
                self.draft = EventDraft::default();
                self.mode = Mode::Adding;
            }
            (Mode::Idle, Intent::OpenEdit(slot)) => {
                let event = self.store.event_at(self.active_date, slot)?;
                self.draft = EventDraft::from_event(event);
                self.mode = Mode::Editing(slot);
            }
            (Mode::Idle, Intent::OpenDatePicker) => {
                self.mode = Mode::SelectingDate(PickerOrigin::Idle);
            }
            (Mode::Adding, Intent::OpenDatePicker) => {
                self.mode = Mode::SelectingDate(PickerOrigin::Adding);
            }
            (Mode::Idle, Intent::ToggleSummary) => self.mode = Mode::ViewingSummary,
            (Mode::ViewingSummary, Intent::ToggleSummary) => self.mode = Mode::Idle,
            (Mode::Adding, Intent::Submit) => {
                let date = self.active_date;
                let slot = self.store.add_event(date, self.draft.to_event());
                self.finish(Notification::EventAdded { date, slot });
            }
            (Mode::Editing(slot), Intent::Submit) => {
                let date = self.active_date;
                self.store.update_event(date, slot, self.draft.to_event())?;
                self.finish(Notification::EventUpdated { date, slot });
            }
            (Mode::Editing(slot), Intent::RequestDelete) => {
                self.mode = Mode::ConfirmingDelete(slot);
            }
            (Mode::ConfirmingDelete(slot), Intent::ConfirmDelete) => {
                let date = self.active_date;
                self.store.delete_event(date, slot)?;
                self.finish(Notification::EventDeleted { date });
            }
            (Mode::SelectingDate(origin), Intent::SelectDate(date)) => {
                self.active_date = date;
                self.mode = origin.mode();
            }
            (Mode::Idle, Intent::Back) => return Ok(Dispatch::Unhandled),
            (mode, Intent::Cancel | Intent::Back) if mode != Mode::Idle => self.close_modal(),
            (mode, intent) => {
                return Err(ControllerError::InvalidTransition {
                    state: mode.name(),
                    intent: intent.name(),
                })
            }
        }
        Ok(Dispatch::Handled)
    }

    fn close_modal(&mut self) {
        self.mode = match self.mode {
            Mode::SelectingDate(origin) => origin.mode(),
            Mode::ConfirmingDelete(slot) => Mode::Editing(slot),
            Mode::Adding | Mode::Editing(_) => {
                self.draft = EventDraft::default();
                Mode::Idle
            }
            Mode::Idle | Mode::ViewingSummary => Mode::Idle,
        };
    }

    fn finish(&mut self, notification: Notification) {
        self.outbox.push(notification);
        self.draft = EventDraft::default();
        self.mode = Mode::Idle;
        self.persist();
    }

    fn persist(&mut self) {
        let sequence = self.sink.submit(self.store.snapshot());
        debug!("event=snapshot_submit module=controller status=ok sequence={sequence}");
    }

    pub fn open_add(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::OpenAdd)
    }

    pub fn open_edit(&mut self, slot: usize) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::OpenEdit(slot))
    }

    pub fn submit(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::Submit)
    }

    pub fn cancel(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::Cancel)
    }

    pub fn request_delete(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::RequestDelete)
    }

    pub fn confirm_delete(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::ConfirmDelete)
    }

    pub fn open_date_picker(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::OpenDatePicker)
    }

    pub fn select_date(&mut self, date: DateKey) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::SelectDate(date))
    }

    pub fn toggle_summary(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::ToggleSummary)
    }

    pub fn toggle_sort(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::ToggleSort)
    }

    pub fn back(&mut self) -> ControllerResult<Dispatch> {
        self.dispatch(Intent::Back)
    }

    /// Mutable access to the form while adding or editing.
    ///
    /// # Errors
    /// - `InvalidTransition` outside `Adding` and `Editing`.
    pub fn edit_draft(&mut self) -> ControllerResult<&mut EventDraft> {
        match self.mode {
            Mode::Adding | Mode::Editing(_) => Ok(&mut self.draft),
            mode => Err(ControllerError::InvalidTransition {
                state: mode.name(),
                intent: "edit_draft",
            }),
        }
    }

    /// Collects finished saves; failures become `SaveFailed` notifications.
    ///
    /// Returns how many save outcomes arrived.
    pub fn poll_saves(&mut self) -> usize {
        let outcomes = self.sink.poll_outcomes();
        let count = outcomes.len();
        for outcome in outcomes {
            if let Err(err) = outcome.result {
                self.outbox.push(Notification::SaveFailed {
                    sequence: outcome.sequence,
                    message: err.to_string(),
                });
            }
        }
        count
    }

    /// Drains queued notifications in emission order.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    /// Events of the active date in the current sort mode.
    pub fn day_view(&self) -> Vec<SlotView> {
        sort_slots(self.store.get_events(self.active_date), self.sort_mode)
            .into_iter()
            .map(|(slot, event)| SlotView {
                slot,
                event: event.clone(),
            })
            .collect()
    }

    pub fn month_marks(&self, range: &DateRange) -> BTreeMap<DateKey, Mark> {
        compute_marks(self.store.view(), range)
    }

    pub fn summary(&self) -> Vec<DayGroup> {
        sorted_summary(self.store.view())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active_date(&self) -> DateKey {
        self.active_date
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
