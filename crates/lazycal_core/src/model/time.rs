//! 12-hour clock codec.
//!
//! # Responsibility
//! - Parse `H(H):MM AM|PM` strings into [`ParsedTime`].
//! - Derive the 24-hour [`SortKey`] used for chronological ordering.
//! - Format 24-hour values back into canonical `HH:MM AM|PM` text.
//!
//! # Invariants
//! - `ParsedTime.hour` is in `1..=12` and `minute` in `0..=59`.
//! - Minutes are exactly two digits. `8:5 AM` is a format error, not 08:05.
//! - `format(to_24_hour(parse(s)))` reproduces `s` for every canonical input
//!   (two-digit hour).
//! - Sort keys are derived on demand and never persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2}) (AM|PM)$").expect("valid clock regex"));

/// AM/PM designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

/// Error returned when clock text or clock values are malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormatError {
    /// Text does not match `H(H):MM AM|PM`.
    Malformed(String),
    /// 12-hour value outside `1..=12`.
    HourOutOfRange(u8),
    /// 24-hour value outside `0..=23`.
    Hour24OutOfRange(u8),
    /// Minute outside `0..=59`.
    MinuteOutOfRange(u8),
}

impl Display for TimeFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(text) => {
                write!(f, "invalid time `{text}`; expected `HH:MM AM` or `HH:MM PM`")
            }
            Self::HourOutOfRange(hour) => write!(f, "hour {hour} is outside 1..=12"),
            Self::Hour24OutOfRange(hour) => write!(f, "hour {hour} is outside 0..=23"),
            Self::MinuteOutOfRange(minute) => write!(f, "minute {minute} is outside 0..=59"),
        }
    }
}

impl Error for TimeFormatError {}

/// Validated 12-hour clock value.
///
/// Serialized as its canonical text form, e.g. `"08:30 PM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParsedTime {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

/// 24-hour comparison key derived from a [`ParsedTime`].
///
/// Field order matters: derived `Ord` compares `hour24` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pub hour24: u8,
    pub minute: u8,
}

impl ParsedTime {
    /// Default slot offered by the add form.
    pub const EIGHT_AM: Self = Self {
        hour: 8,
        minute: 0,
        meridiem: Meridiem::Am,
    };

    /// Builds a clock value from 12-hour parts.
    ///
    /// # Errors
    /// - `HourOutOfRange` when `hour` is not in `1..=12`.
    /// - `MinuteOutOfRange` when `minute` is above 59.
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Result<Self, TimeFormatError> {
        if !(1..=12).contains(&hour) {
            return Err(TimeFormatError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeFormatError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour,
            minute,
            meridiem,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Returns the derived 24-hour key for this value.
    pub fn sort_key(&self) -> SortKey {
        to_24_hour(self)
    }
}

impl Display for ParsedTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02} {}",
            self.hour,
            self.minute,
            self.meridiem.as_str()
        )
    }
}

impl TryFrom<String> for ParsedTime {
    type Error = TimeFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(value.as_str())
    }
}

impl From<ParsedTime> for String {
    fn from(value: ParsedTime) -> Self {
        value.to_string()
    }
}

impl std::str::FromStr for ParsedTime {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses `H(H):MM AM|PM` text.
///
/// Input must match exactly: one or two hour digits, two minute digits, one
/// space, upper-case designator. Surrounding whitespace is not trimmed.
pub fn parse(text: &str) -> Result<ParsedTime, TimeFormatError> {
    let caps = CLOCK_RE
        .captures(text)
        .ok_or_else(|| TimeFormatError::Malformed(text.to_string()))?;

    // Regex guarantees 1-2 ascii digits per group, so u8 parsing cannot overflow.
    let hour = caps[1]
        .parse::<u8>()
        .map_err(|_| TimeFormatError::Malformed(text.to_string()))?;
    let minute = caps[2]
        .parse::<u8>()
        .map_err(|_| TimeFormatError::Malformed(text.to_string()))?;
    let meridiem = match &caps[3] {
        "AM" => Meridiem::Am,
        _ => Meridiem::Pm,
    };

    ParsedTime::new(hour, minute, meridiem)
}

/// Converts a 12-hour value into its 24-hour sort key.
///
/// 12 AM maps to hour 0, 12 PM stays 12, other PM hours add 12.
pub fn to_24_hour(parsed: &ParsedTime) -> SortKey {
    let hour24 = match (parsed.meridiem, parsed.hour) {
        (Meridiem::Am, 12) => 0,
        (Meridiem::Am, hour) => hour,
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, hour) => hour + 12,
    };
    SortKey {
        hour24,
        minute: parsed.minute,
    }
}

/// Builds a 12-hour value from 24-hour parts.
pub fn from_24_hour(hour24: u8, minute: u8) -> Result<ParsedTime, TimeFormatError> {
    if hour24 > 23 {
        return Err(TimeFormatError::Hour24OutOfRange(hour24));
    }
    let meridiem = if hour24 >= 12 {
        Meridiem::Pm
    } else {
        Meridiem::Am
    };
    let hour = match hour24 % 12 {
        0 => 12,
        other => other,
    };
    ParsedTime::new(hour, minute, meridiem)
}

/// Formats 24-hour parts as canonical `HH:MM AM|PM` text.
pub fn format(hour24: u8, minute: u8) -> Result<String, TimeFormatError> {
    from_24_hour(hour24, minute).map(|parsed| parsed.to_string())
}
