//! Calendar event domain model.
//!
//! # Responsibility
//! - Define the immutable record stored in each day bucket.
//! - Map priority wire labels (`Urgent`, `normal`, `low`) to ranks.
//!
//! # Invariants
//! - `Event.time` is always a valid 12-hour clock value.
//! - Events are never edited in place; updates replace the whole record.
//! - Unknown or missing priority labels rank and color like `low`.
//!
//! # See also
//! - `crate::model::time` for the clock codec.

use crate::model::time::{self, ParsedTime, TimeFormatError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const NO_TITLE_PLACEHOLDER: &str = "No title";
const NO_DESCRIPTION_PLACEHOLDER: &str = "Calendar event";

/// Event priority.
///
/// Serialized with the labels stored by the mobile shell. Unrecognized labels
/// are kept verbatim so a load/save cycle does not rewrite foreign data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Urgent,
    Normal,
    #[default]
    Low,
    Unrecognized(String),
}

impl Priority {
    /// Maps a wire label to a priority. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Urgent" => Self::Urgent,
            "normal" => Self::Normal,
            "low" => Self::Low,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Urgent => "Urgent",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Unrecognized(label) => label.as_str(),
        }
    }

    /// Sort rank: Urgent=1, normal=2, low and anything else=3.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::Normal => 2,
            Self::Low | Self::Unrecognized(_) => 3,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Self::from_label(value.as_str())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Unrecognized(label) => label,
            other => other.label().to_string(),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One scheduled item inside a day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    title: String,
    description: String,
    time: ParsedTime,
    #[serde(default)]
    priority: Priority,
}

impl Event {
    /// Creates an event from raw clock text.
    ///
    /// # Errors
    /// - Returns `TimeFormatError` when `time` is not `H(H):MM AM|PM`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        time: &str,
        priority: Priority,
    ) -> Result<Self, TimeFormatError> {
        Ok(Self::with_time(
            title,
            description,
            time::parse(time)?,
            priority,
        ))
    }

    /// Creates an event from an already validated clock value.
    pub fn with_time(
        title: impl Into<String>,
        description: impl Into<String>,
        time: ParsedTime,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            time,
            priority,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn time(&self) -> ParsedTime {
        self.time
    }

    pub fn priority(&self) -> &Priority {
        &self.priority
    }

    /// Title for list rendering; blank titles become `No title`.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            NO_TITLE_PLACEHOLDER
        } else {
            &self.title
        }
    }

    /// Description for list rendering; blank text becomes `Calendar event`.
    pub fn display_description(&self) -> &str {
        if self.description.trim().is_empty() {
            NO_DESCRIPTION_PLACEHOLDER
        } else {
            &self.description
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, Priority};

    #[test]
    fn priority_labels_round_trip_including_unknown() {
        for label in ["Urgent", "normal", "low", "someday"] {
            let priority = Priority::from_label(label);
            assert_eq!(String::from(priority), label);
        }
    }

    #[test]
    fn unknown_priority_ranks_as_low() {
        assert_eq!(Priority::from_label("High").rank(), Priority::Low.rank());
        assert_eq!(Priority::from_label("").rank(), 3);
    }

    #[test]
    fn display_placeholders_apply_to_blank_text() {
        let event = Event::new("  ", "", "09:00 AM", Priority::Low).unwrap();
        assert_eq!(event.display_title(), "No title");
        assert_eq!(event.display_description(), "Calendar event");
    }
}
