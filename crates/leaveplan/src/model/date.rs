//! `DD.MM.YYYY` wire dates.

use chrono::NaiveDate;

/// Format used for every calendar-facing date.
pub const DOTTED_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parses `DD.MM.YYYY`. One-digit day or month values are accepted.
pub fn parse_dotted(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('.');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year_part = parts.next()?.trim();
    if parts.next().is_some() || year_part.len() != 4 {
        return None;
    }
    let year = year_part.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses either `DD.MM.YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_flexible(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_dotted(trimmed))
}

pub fn format_dotted(date: NaiveDate) -> String {
    date.format(DOTTED_DATE_FORMAT).to_string()
}

/// Converts a boundary date (ISO or dotted) to the dotted wire format.
pub fn to_dotted(text: &str) -> Option<String> {
    parse_flexible(text).map(format_dotted)
}
