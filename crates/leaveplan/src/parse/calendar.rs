//! Academic-calendar extraction from OCR lines.
//!
//! Each line is tried against a fixed list of shapes, first match wins:
//!
//! 1. `DD.MM.YYYY Day [description]`
//! 2. `DD.MM.YYYY` on its own, held for the next line
//! 3. a single word completing a held date
//! 4. any line splitting into two or more fields on runs of spaces, `|`,
//!    tabs or hyphens (`date | day | description...`)
//!
//! Entries are returned in input order. Nothing here fails: unrecognised
//! lines are dropped.

use crate::model::CalendarEntry;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static DATED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})\s+([A-Za-z]+)\b(.*)$").unwrap()
});
static DATE_ONLY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$").unwrap());
static SINGLE_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());
static FIELD_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\||\t|-").unwrap());
static LEADING_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}").unwrap());
static HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(date|day)s?\b").unwrap());

/// What a single line turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum LineShape {
    Entry(CalendarEntry),
    DateOnly(String),
    Word(String),
    Fields(Vec<String>),
    Unrecognised,
}

/// Parses normalized calendar lines into entries.
pub fn parse_calendar(lines: &[String]) -> Vec<CalendarEntry> {
    let body = match lines.first() {
        Some(first) if is_header(first) => &lines[1..],
        _ => lines,
    };

    let (entries, _pending) = body.iter().fold(
        (Vec::new(), None::<String>),
        |(mut entries, pending), line| {
            let pending = match (classify(line), pending) {
                (LineShape::Entry(entry), _) => {
                    entries.push(entry);
                    None
                }
                (LineShape::DateOnly(date), _) => Some(date),
                (LineShape::Word(day), Some(date)) => {
                    entries.push(CalendarEntry::new(date, day, None));
                    None
                }
                (LineShape::Fields(fields), _) => {
                    entries.push(entry_from_fields(fields));
                    None
                }
                (LineShape::Word(_) | LineShape::Unrecognised, _) => {
                    debug!(line = %line, "Dropping unrecognised calendar line");
                    None
                }
            };
            (entries, pending)
        },
    );

    debug!(
        lines = lines.len(),
        entries = entries.len(),
        "Parsed academic calendar"
    );
    entries
}

fn is_header(line: &str) -> bool {
    HEADER_REGEX.is_match(line) && !LEADING_DATE_REGEX.is_match(line)
}

fn classify(line: &str) -> LineShape {
    if let Some(caps) = DATED_LINE_REGEX.captures(line) {
        let date = padded_date(&caps[1], &caps[2], &caps[3]);
        let day = caps[4].to_string();
        let holiday = clean_description(&caps[5]);
        return LineShape::Entry(CalendarEntry::new(date, day, holiday));
    }

    if let Some(caps) = DATE_ONLY_REGEX.captures(line) {
        return LineShape::DateOnly(padded_date(&caps[1], &caps[2], &caps[3]));
    }

    if SINGLE_WORD_REGEX.is_match(line) {
        return LineShape::Word(line.to_string());
    }

    let fields: Vec<String> = FIELD_SEPARATOR_REGEX
        .split(line)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if fields.len() >= 2 {
        LineShape::Fields(fields)
    } else {
        LineShape::Unrecognised
    }
}

fn entry_from_fields(fields: Vec<String>) -> CalendarEntry {
    let mut fields = fields.into_iter();
    let date = fields.next().unwrap_or_default();
    let day = fields.next().unwrap_or_default();
    let rest = fields.collect::<Vec<_>>().join(" ");

    let date = match DATE_ONLY_REGEX.captures(&date) {
        Some(caps) => padded_date(&caps[1], &caps[2], &caps[3]),
        None => date,
    };
    CalendarEntry::new(date, day, clean_description(&rest))
}

fn padded_date(day: &str, month: &str, year: &str) -> String {
    format!("{:0>2}.{:0>2}.{}", day, month, year)
}

/// Trims whitespace and leading separator punctuation; empty becomes `None`.
fn clean_description(text: &str) -> Option<String> {
    let cleaned = text
        .trim()
        .trim_start_matches(['-', '|', ':', ','])
        .trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
