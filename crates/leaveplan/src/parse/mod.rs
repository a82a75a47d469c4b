//! OCR text parsing: normalization, timetable extraction, calendar extraction.

mod calendar;
mod normalize;
mod timetable;

pub use calendar::parse_calendar;
pub use normalize::{clean_line, clean_text, normalize_lines};
pub use timetable::TimetableParser;

use crate::config::ParserConfig;
use crate::model::{CalendarEntry, TimetableParse};

/// Normalizes raw OCR text and parses it as a timetable.
pub fn parse_timetable_text(config: &ParserConfig, raw_text: &str) -> TimetableParse {
    let lines = normalize_lines(raw_text);
    TimetableParser::new(config).parse(&lines, raw_text)
}

/// Normalizes raw OCR text and parses it as an academic calendar.
pub fn parse_calendar_text(raw_text: &str) -> Vec<CalendarEntry> {
    parse_calendar(&normalize_lines(raw_text))
}
