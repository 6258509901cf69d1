//! Editable form state for add/edit flows.
//!
//! # Invariants
//! - A draft always holds a valid clock value, so `to_event` cannot fail.
//! - A cleared draft is `08:00 AM`, priority `low`, empty text.

use crate::model::event::{Event, Priority};
use crate::model::time::{self, ParsedTime, TimeFormatError};

/// Field values of the event currently being added or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    time: ParsedTime,
    pub priority: Priority,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            time: ParsedTime::EIGHT_AM,
            priority: Priority::Low,
        }
    }
}

impl EventDraft {
    /// Copies every field of a stored event into a new draft.
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title().to_string(),
            description: event.description().to_string(),
            time: event.time(),
            priority: event.priority().clone(),
        }
    }

    pub fn time(&self) -> ParsedTime {
        self.time
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Applies a time-picker value given in 24-hour form.
    ///
    /// The draft keeps its previous time when the input is rejected.
    pub fn set_time(&mut self, hour24: u8, minute: u8) -> Result<(), TimeFormatError> {
        self.time = time::from_24_hour(hour24, minute)?;
        Ok(())
    }

    /// Builds the immutable record to store.
    pub fn to_event(&self) -> Event {
        Event::with_time(
            self.title.clone(),
            self.description.clone(),
            self.time,
            self.priority.clone(),
        )
    }
}
