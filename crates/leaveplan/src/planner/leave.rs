//! Strategic-leave suggestions around mid-week holidays.
//!
//! A Thursday holiday pairs with the Friday after it, a Tuesday holiday with
//! the Monday before it. A Wednesday holiday yields two alternatives: take
//! Monday and Tuesday, or Thursday and Friday. The weekday always comes from
//! the parsed date, never from the OCR'd day text.

use crate::model::{
    format_dotted, parse_dotted, CalendarEntry, DatedDay, DayName, LeaveCategory, LeaveSuggestion,
};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct LeaveOptimizer {
    holidays_only: bool,
}

impl LeaveOptimizer {
    pub fn new(holidays_only: bool) -> Self {
        Self { holidays_only }
    }

    /// Builds suggestions in ascending holiday order. Adjacent holidays are
    /// not merged; every suggestion stands on its own.
    pub fn optimize(&self, entries: &[CalendarEntry]) -> Vec<LeaveSuggestion> {
        let mut holidays: Vec<NaiveDate> = entries
            .iter()
            .filter(|entry| self.is_candidate(entry))
            .filter_map(|entry| match parse_dotted(&entry.date) {
                Some(date) => Some(date),
                None => {
                    warn!(date = %entry.date, day = %entry.day, "Skipping calendar entry with unparseable date");
                    None
                }
            })
            .collect();
        holidays.sort();

        let suggestions: Vec<LeaveSuggestion> = holidays
            .into_iter()
            .flat_map(suggestions_for)
            .collect();

        debug!(
            entries = entries.len(),
            suggestions = suggestions.len(),
            "Computed strategic leaves"
        );
        suggestions
    }

    fn is_candidate(&self, entry: &CalendarEntry) -> bool {
        let has_date_and_day = !entry.date.trim().is_empty() && !entry.day.trim().is_empty();
        let has_holiday = entry
            .holiday
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty());
        has_date_and_day && (!self.holidays_only || has_holiday)
    }
}

fn suggestions_for(holiday: NaiveDate) -> Vec<LeaveSuggestion> {
    let built = match holiday.weekday() {
        Weekday::Thu => vec![long_weekend_after(holiday)],
        Weekday::Tue => vec![long_weekend_before(holiday)],
        Weekday::Wed => vec![midweek_before(holiday), midweek_after(holiday)],
        _ => Vec::new(),
    };
    // `None` only when the neighbouring days fall outside chrono's range.
    built.into_iter().flatten().collect()
}

fn long_weekend_after(thursday: NaiveDate) -> Option<LeaveSuggestion> {
    let friday = shift(thursday, 1)?;
    Some(LeaveSuggestion {
        category: LeaveCategory::LongWeekend,
        strategy: format!(
            "Take leave on Friday ({}) after the holiday on Thursday ({}) for a 4-day weekend",
            format_dotted(friday),
            format_dotted(thursday)
        ),
        leave_days: vec![dated(friday)],
        holidays: vec![dated(thursday)],
        days_off: 4,
        leaves_used: 1,
    })
}

fn long_weekend_before(tuesday: NaiveDate) -> Option<LeaveSuggestion> {
    let monday = shift(tuesday, -1)?;
    Some(LeaveSuggestion {
        category: LeaveCategory::LongWeekend,
        strategy: format!(
            "Take leave on Monday ({}) before the holiday on Tuesday ({}) for a 4-day weekend",
            format_dotted(monday),
            format_dotted(tuesday)
        ),
        leave_days: vec![dated(monday)],
        holidays: vec![dated(tuesday)],
        days_off: 4,
        leaves_used: 1,
    })
}

fn midweek_before(wednesday: NaiveDate) -> Option<LeaveSuggestion> {
    let monday = shift(wednesday, -2)?;
    let tuesday = shift(wednesday, -1)?;
    Some(LeaveSuggestion {
        category: LeaveCategory::MidWeekBreak,
        strategy: format!(
            "Take leave on Monday ({}) and Tuesday ({}) before the holiday on Wednesday ({}) for a 5-day break",
            format_dotted(monday),
            format_dotted(tuesday),
            format_dotted(wednesday)
        ),
        leave_days: vec![dated(monday), dated(tuesday)],
        holidays: vec![dated(wednesday)],
        days_off: 5,
        leaves_used: 2,
    })
}

fn midweek_after(wednesday: NaiveDate) -> Option<LeaveSuggestion> {
    let thursday = shift(wednesday, 1)?;
    let friday = shift(wednesday, 2)?;
    Some(LeaveSuggestion {
        category: LeaveCategory::MidWeekBreak,
        strategy: format!(
            "Take leave on Thursday ({}) and Friday ({}) after the holiday on Wednesday ({}) for a 5-day break",
            format_dotted(thursday),
            format_dotted(friday),
            format_dotted(wednesday)
        ),
        leave_days: vec![dated(thursday), dated(friday)],
        holidays: vec![dated(wednesday)],
        days_off: 5,
        leaves_used: 2,
    })
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn dated(date: NaiveDate) -> DatedDay {
    DatedDay {
        date: format_dotted(date),
        day: DayName::from(date.weekday()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, day: &str, holiday: Option<&str>) -> CalendarEntry {
        CalendarEntry::new(date, day, holiday.map(str::to_string))
    }

    fn day(date: &str, name: &str) -> DatedDay {
        DatedDay {
            date: date.to_string(),
            day: name.to_string(),
        }
    }

    #[test]
    fn test_thursday_holiday_takes_friday() {
        let suggestions =
            LeaveOptimizer::default().optimize(&[entry("02.01.2025", "Thursday", None)]);
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.category, LeaveCategory::LongWeekend);
        assert_eq!(s.leave_days, vec![day("03.01.2025", "Friday")]);
        assert_eq!(s.holidays, vec![day("02.01.2025", "Thursday")]);
        assert_eq!((s.days_off, s.leaves_used), (4, 1));
        assert_eq!(
            s.strategy,
            "Take leave on Friday (03.01.2025) after the holiday on Thursday (02.01.2025) for a 4-day weekend"
        );
    }

    #[test]
    fn test_wednesday_holiday_has_two_alternatives() {
        let suggestions =
            LeaveOptimizer::default().optimize(&[entry("15.01.2025", "Wednesday", Some("Pongal"))]);
        assert_eq!(suggestions.len(), 2);

        assert_eq!(suggestions[0].category, LeaveCategory::MidWeekBreak);
        assert_eq!(
            suggestions[0].leave_days,
            vec![day("13.01.2025", "Monday"), day("14.01.2025", "Tuesday")]
        );
        assert_eq!(
            suggestions[1].leave_days,
            vec![day("16.01.2025", "Thursday"), day("17.01.2025", "Friday")]
        );
        for s in &suggestions {
            assert_eq!((s.days_off, s.leaves_used), (5, 2));
            assert_eq!(s.holidays, vec![day("15.01.2025", "Wednesday")]);
        }
    }

    #[test]
    fn test_tuesday_holiday_takes_monday() {
        let suggestions = LeaveOptimizer::default().optimize(&[entry("14.01.2025", "Tue", None)]);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].leave_days, vec![day("13.01.2025", "Monday")]);
        assert!(suggestions[0].strategy.starts_with("Take leave on Monday (13.01.2025) before"));
    }

    #[test]
    fn test_weekday_comes_from_the_date_not_the_text() {
        // 02.01.2025 is a Thursday whatever the OCR said.
        let suggestions =
            LeaveOptimizer::default().optimize(&[entry("02.01.2025", "Monday", None)]);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, LeaveCategory::LongWeekend);
    }

    #[test]
    fn test_other_weekdays_and_bad_entries_yield_nothing() {
        let entries = [
            entry("31.03.2025", "Monday", Some("Eid")),
            entry("04.04.2025", "Friday", None),
            entry("05.04.2025", "Saturday", None),
            entry("Jan 26", "Sunday", Some("Republic Day")),
            entry("", "Thursday", None),
            entry("02.01.2025", " ", None),
        ];
        assert!(LeaveOptimizer::default().optimize(&entries).is_empty());
    }

    #[test]
    fn test_suggestions_follow_date_order() {
        let entries = [
            entry("15.01.2025", "Wednesday", None),
            entry("02.01.2025", "Thursday", None),
            entry("14.01.2025", "Tuesday", None),
        ];
        let holidays: Vec<_> = LeaveOptimizer::default()
            .optimize(&entries)
            .into_iter()
            .map(|s| s.holidays[0].date.clone())
            .collect();
        assert_eq!(
            holidays,
            vec!["02.01.2025", "14.01.2025", "15.01.2025", "15.01.2025"]
        );
    }

    #[test]
    fn test_holidays_only_requires_a_description() {
        let entries = [
            entry("02.01.2025", "Thursday", None),
            entry("14.01.2025", "Tuesday", Some("Pongal")),
        ];
        let suggestions = LeaveOptimizer::new(true).optimize(&entries);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].holidays[0].date, "14.01.2025");
    }
}
