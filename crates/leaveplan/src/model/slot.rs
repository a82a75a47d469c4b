//! Weekday identifiers and canonical time slots.

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A weekday identifier as it appears in timetables and calendars.
///
/// Ordering follows the teaching week (Monday first), which is also the
/// order days are emitted in when a [`super::Timetable`] is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayName {
    pub const ALL: [DayName; 7] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
        DayName::Sunday,
    ];

    pub const WEEKDAYS: [DayName; 5] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DayName::Monday => "Monday",
            DayName::Tuesday => "Tuesday",
            DayName::Wednesday => "Wednesday",
            DayName::Thursday => "Thursday",
            DayName::Friday => "Friday",
            DayName::Saturday => "Saturday",
            DayName::Sunday => "Sunday",
        }
    }

    /// Three-letter abbreviation, lowercase (`"mon"`, `"tue"`, ...).
    pub fn abbreviation(self) -> &'static str {
        &LOWER_NAMES[self as usize][..3]
    }

    pub fn lowercase_name(self) -> &'static str {
        LOWER_NAMES[self as usize]
    }

    /// Parses a full day name or a three-letter abbreviation, ignoring case.
    pub fn from_name(text: &str) -> Option<Self> {
        let lower = text.trim().to_ascii_lowercase();
        DayName::ALL
            .into_iter()
            .find(|d| lower == d.lowercase_name() || lower == d.abbreviation())
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, DayName::Saturday | DayName::Sunday)
    }
}

static LOWER_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl From<Weekday> for DayName {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayName::Monday,
            Weekday::Tue => DayName::Tuesday,
            Weekday::Wed => DayName::Wednesday,
            Weekday::Thu => DayName::Thursday,
            Weekday::Fri => DayName::Friday,
            Weekday::Sat => DayName::Saturday,
            Weekday::Sun => DayName::Sunday,
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced when reading a `HH:MM-HH:MM` slot label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotParseError {
    #[error("time slot '{0}' is not of the form HH:MM-HH:MM")]
    Format(String),

    #[error("time slot '{0}' ends before it starts")]
    Inverted(String),
}

/// A half-open class period, `[start, end)`, written `HH:MM-HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Builds a slot from hour/minute pairs. Returns `None` for invalid
    /// clock values or an empty/inverted interval.
    pub fn from_hm(start_hr: u32, start_min: u32, end_hr: u32, end_min: u32) -> Option<Self> {
        let start = NaiveTime::from_hms_opt(start_hr, start_min, 0)?;
        let end = NaiveTime::from_hms_opt(end_hr, end_min, 0)?;
        (start < end).then_some(TimeSlot { start, end })
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn starts_after_noon(&self) -> bool {
        self.start.hour() >= 12
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

impl FromStr for TimeSlot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || SlotParseError::Format(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(format_err)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| format_err())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| format_err())?;
        if start >= end {
            return Err(SlotParseError::Inverted(s.to_string()));
        }
        Ok(TimeSlot { start, end })
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The default grid: eight periods from 09:00 to 17:30 with a lunch gap
/// between 13:00 and 13:30.
pub fn default_time_slots() -> Vec<TimeSlot> {
    [
        (9, 0, 10, 0),
        (10, 0, 11, 0),
        (11, 0, 12, 0),
        (12, 0, 13, 0),
        (13, 30, 14, 30),
        (14, 30, 15, 30),
        (15, 30, 16, 30),
        (16, 30, 17, 30),
    ]
    .into_iter()
    .filter_map(|(sh, sm, eh, em)| TimeSlot::from_hm(sh, sm, eh, em))
    .collect()
}
