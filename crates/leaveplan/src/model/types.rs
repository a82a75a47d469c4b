//! Structured records produced by the parsers and the planner.

use super::slot::{DayName, TimeSlot};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Sentinel written into every slot without a class.
pub const FREE: &str = "Free";

/// Content of one (day, slot) cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Free,
    /// One or more course labels joined with `", "`.
    Class(String),
}

impl Cell {
    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cell::Free => FREE,
            Cell::Class(text) => text,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Only the exact sentinel (or nothing at all) is free.
        if raw == FREE || raw.trim().is_empty() {
            Ok(Cell::Free)
        } else {
            Ok(Cell::Class(raw))
        }
    }
}

/// Weekly schedule: day -> slot -> cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable(BTreeMap<DayName, BTreeMap<TimeSlot, Cell>>);

impl Timetable {
    /// A timetable where every (day, slot) pair is `Free`.
    pub fn blank(days: &[DayName], slots: &[TimeSlot]) -> Self {
        let grid = days
            .iter()
            .map(|day| (*day, slots.iter().map(|s| (*s, Cell::Free)).collect()))
            .collect();
        Timetable(grid)
    }

    pub fn get(&self, day: DayName, slot: &TimeSlot) -> Option<&Cell> {
        self.0.get(&day).and_then(|slots| slots.get(slot))
    }

    pub fn set(&mut self, day: DayName, slot: TimeSlot, cell: Cell) {
        self.0.entry(day).or_default().insert(slot, cell);
    }

    pub fn days(&self) -> impl Iterator<Item = DayName> + '_ {
        self.0.keys().copied()
    }

    /// Every cell in day-major order.
    pub fn cells(&self) -> impl Iterator<Item = (DayName, &TimeSlot, &Cell)> + '_ {
        self.0
            .iter()
            .flat_map(|(day, slots)| slots.iter().map(move |(slot, cell)| (*day, slot, cell)))
    }

    pub fn filled_count(&self) -> usize {
        self.cells().filter(|(_, _, cell)| !cell.is_free()).count()
    }

    pub fn cell_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }
}

/// How much the timetable parser trusts its own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseConfidence {
    /// Cells were attributed from day/time context in the text.
    Structured,
    /// Some cells were filled by positional best-effort recovery.
    Recovered,
    /// Nothing was extracted.
    Empty,
}

impl ParseConfidence {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseConfidence::Structured => "structured",
            ParseConfidence::Recovered => "recovered",
            ParseConfidence::Empty => "empty",
        }
    }

    pub fn from_str_lossy(text: &str) -> Self {
        match text {
            "structured" => ParseConfidence::Structured,
            "recovered" => ParseConfidence::Recovered,
            _ => ParseConfidence::Empty,
        }
    }
}

/// Output of the timetable parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableParse {
    pub timetable: Timetable,
    pub confidence: ParseConfidence,
    /// Cells filled from a day + time-slot context.
    pub matched_cells: usize,
    /// Cells filled by positional recovery.
    pub recovered_cells: usize,
}

/// One calendar row: `DD.MM.YYYY`, day text, optional holiday description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub date: String,
    pub day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,
}

impl CalendarEntry {
    pub fn new(date: impl Into<String>, day: impl Into<String>, holiday: Option<String>) -> Self {
        Self {
            date: date.into(),
            day: day.into(),
            holiday,
        }
    }
}

/// A user's calendar plus the semester boundaries it was uploaded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicCalendar {
    pub user_id: String,
    pub entries: Vec<CalendarEntry>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A concrete date and its weekday name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedDay {
    pub date: String,
    pub day: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveCategory {
    #[serde(rename = "Long Weekend")]
    LongWeekend,
    #[serde(rename = "Mid-week Break")]
    MidWeekBreak,
}

/// A suggested set of leave days around a holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSuggestion {
    #[serde(rename = "type")]
    pub category: LeaveCategory,
    pub strategy: String,
    pub leave_days: Vec<DatedDay>,
    pub holidays: Vec<DatedDay>,
    pub days_off: u32,
    pub leaves_used: u32,
}

/// Class total with the 75% attendance budget derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFigures {
    pub total_classes: u32,
    pub min_attendance_required: u32,
    pub max_allowed_absences: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAttendance {
    #[serde(flatten)]
    pub figures: AttendanceFigures,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttendance {
    pub working_days: u32,
    pub total_weeks: u32,
    pub subjects: BTreeMap<String, AttendanceFigures>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceNotice {
    pub message: String,
}

/// Attendance budget for a semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttendanceInfo {
    PerSubject(SubjectAttendance),
    Aggregate(AggregateAttendance),
    /// Inputs were missing or unusable; only a message for the user.
    Unavailable(AttendanceNotice),
}

impl AttendanceInfo {
    pub fn unavailable(message: impl Into<String>) -> Self {
        AttendanceInfo::Unavailable(AttendanceNotice {
            message: message.into(),
        })
    }

    pub fn message(&self) -> &str {
        match self {
            AttendanceInfo::PerSubject(info) => &info.message,
            AttendanceInfo::Aggregate(info) => &info.message,
            AttendanceInfo::Unavailable(info) => &info.message,
        }
    }
}
