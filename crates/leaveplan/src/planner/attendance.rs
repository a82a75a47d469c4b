//! Attendance budget for a semester.
//!
//! Counts working days (Monday to Friday) in the inclusive semester range,
//! turns them into teaching weeks and multiplies the weekly class counts by
//! the number of weeks. The minimum is 75% of the total, rounded up.

use super::summary::{summarize, weekly_class_count};
use crate::model::{
    format_dotted, parse_flexible, AggregateAttendance, AttendanceFigures, AttendanceInfo,
    SubjectAttendance, Timetable,
};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Minimum share of classes a student has to attend, in percent.
pub const MIN_ATTENDANCE_PERCENT: u32 = 75;

const MISSING_INPUT_MESSAGE: &str = "To calculate attendance requirements, please upload a \
     timetable and specify semester start/end dates.";
const BAD_DATES_MESSAGE: &str = "Could not calculate attendance requirements. Please ensure \
     semester dates are correctly formatted.";

/// Whether classes are budgeted per course or as one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMode {
    #[default]
    PerSubject,
    Aggregate,
}

/// `ceil(total * 75%)` and what is left over for absences.
pub fn attendance_figures(total_classes: u32) -> AttendanceFigures {
    let scaled = u64::from(total_classes) * u64::from(MIN_ATTENDANCE_PERCENT);
    let min = scaled.div_ceil(100) as u32;
    AttendanceFigures {
        total_classes,
        min_attendance_required: min,
        max_allowed_absences: total_classes - min,
    }
}

/// Monday-to-Friday days in `[start, end]`; zero when `start > end`.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

/// Teaching weeks covered by `working_days`, rounded up.
pub fn total_weeks(working_days: u32) -> u32 {
    working_days.div_ceil(5)
}

/// Computes the attendance budget.
///
/// Missing or unusable inputs produce [`AttendanceInfo::Unavailable`] with a
/// message for the user; this never fails.
pub fn compute_attendance(
    start_date: Option<&str>,
    end_date: Option<&str>,
    timetable: Option<&Timetable>,
    mode: AttendanceMode,
) -> AttendanceInfo {
    let (Some(start_text), Some(end_text), Some(timetable)) = (
        start_date.filter(|s| !s.trim().is_empty()),
        end_date.filter(|s| !s.trim().is_empty()),
        timetable,
    ) else {
        return AttendanceInfo::unavailable(MISSING_INPUT_MESSAGE);
    };

    let (Some(start), Some(end)) = (parse_flexible(start_text), parse_flexible(end_text)) else {
        warn!(
            start_date = %start_text,
            end_date = %end_text,
            "Semester dates could not be parsed"
        );
        return AttendanceInfo::unavailable(BAD_DATES_MESSAGE);
    };
    if start > end {
        warn!(
            start_date = %format_dotted(start),
            end_date = %format_dotted(end),
            "Semester starts after it ends"
        );
        return AttendanceInfo::unavailable(BAD_DATES_MESSAGE);
    }

    let working_days = working_days(start, end);
    let weeks = total_weeks(working_days);

    match mode {
        AttendanceMode::Aggregate => {
            let figures = attendance_figures(weekly_class_count(timetable) * weeks);
            AttendanceInfo::Aggregate(AggregateAttendance {
                message: format!(
                    "You can miss up to {} classes to maintain {}% attendance. The semester \
                     has approximately {} total classes.",
                    figures.max_allowed_absences, MIN_ATTENDANCE_PERCENT, figures.total_classes
                ),
                figures,
            })
        }
        AttendanceMode::PerSubject => {
            let subjects: std::collections::BTreeMap<_, _> = summarize(timetable)
                .into_iter()
                .map(|(code, weekly)| (code, attendance_figures(weekly * weeks)))
                .collect();
            let message = if subjects.is_empty() {
                "No classes were found in the timetable.".to_string()
            } else {
                format!(
                    "Attendance budget for {} subjects over {} weeks ({} working days). \
                     Attend at least {}% of the classes of each subject.",
                    subjects.len(),
                    weeks,
                    working_days,
                    MIN_ATTENDANCE_PERCENT
                )
            };
            AttendanceInfo::PerSubject(SubjectAttendance {
                working_days,
                total_weeks: weeks,
                subjects,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_time_slots, Cell, DayName};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_cse_101() -> Timetable {
        let slots = default_time_slots();
        let mut timetable = Timetable::blank(&DayName::WEEKDAYS, &slots);
        for (index, day) in DayName::WEEKDAYS.iter().enumerate() {
            timetable.set(*day, slots[index], Cell::Class("CSE 101".to_string()));
        }
        timetable.set(DayName::Monday, slots[5], Cell::Class("MAT 202".to_string()));
        timetable
    }

    #[test]
    fn test_min_plus_max_is_total() {
        for total in 0..500u32 {
            let figures = attendance_figures(total);
            assert_eq!(
                figures.min_attendance_required + figures.max_allowed_absences,
                total
            );
            let expected = (f64::from(total) * 0.75).ceil() as u32;
            assert_eq!(figures.min_attendance_required, expected, "total {total}");
        }
    }

    #[test]
    fn test_working_days_skip_weekends() {
        // Wed 01.01.2025 .. Tue 14.01.2025
        assert_eq!(working_days(date(2025, 1, 1), date(2025, 1, 14)), 10);
        assert_eq!(working_days(date(2025, 1, 4), date(2025, 1, 5)), 0);
        assert_eq!(working_days(date(2025, 1, 6), date(2025, 1, 6)), 1);
        assert_eq!(working_days(date(2025, 1, 7), date(2025, 1, 6)), 0);
    }

    #[test]
    fn test_total_weeks_rounds_up() {
        assert_eq!(total_weeks(0), 0);
        assert_eq!(total_weeks(5), 1);
        assert_eq!(total_weeks(6), 2);
        assert_eq!(total_weeks(10), 2);
    }

    #[test]
    fn test_per_subject_budget() {
        let info = compute_attendance(
            Some("01.01.2025"),
            Some("14.01.2025"),
            Some(&weekly_cse_101()),
            AttendanceMode::PerSubject,
        );
        let AttendanceInfo::PerSubject(info) = info else {
            panic!("expected per-subject attendance, got {info:?}");
        };
        assert_eq!(info.working_days, 10);
        assert_eq!(info.total_weeks, 2);
        assert_eq!(
            info.subjects["CSE 101"],
            AttendanceFigures {
                total_classes: 10,
                min_attendance_required: 8,
                max_allowed_absences: 2,
            }
        );
        assert_eq!(info.subjects["MAT 202"].total_classes, 2);
        assert_eq!(info.subjects["MAT 202"].min_attendance_required, 2);
    }

    #[test]
    fn test_aggregate_budget_and_message() {
        let info = compute_attendance(
            Some("2025-01-01"),
            Some("2025-01-14"),
            Some(&weekly_cse_101()),
            AttendanceMode::Aggregate,
        );
        let AttendanceInfo::Aggregate(info) = info else {
            panic!("expected aggregate attendance, got {info:?}");
        };
        assert_eq!(info.figures.total_classes, 12);
        assert_eq!(info.figures.min_attendance_required, 9);
        assert_eq!(info.figures.max_allowed_absences, 3);
        assert_eq!(
            info.message,
            "You can miss up to 3 classes to maintain 75% attendance. The semester has \
             approximately 12 total classes."
        );
    }

    #[test]
    fn test_missing_inputs_are_informational() {
        let timetable = weekly_cse_101();
        for info in [
            compute_attendance(None, Some("14.01.2025"), Some(&timetable), AttendanceMode::PerSubject),
            compute_attendance(Some("01.01.2025"), Some(" "), Some(&timetable), AttendanceMode::Aggregate),
            compute_attendance(Some("01.01.2025"), Some("14.01.2025"), None, AttendanceMode::PerSubject),
        ] {
            assert_eq!(info.message(), MISSING_INPUT_MESSAGE);
            assert!(matches!(info, AttendanceInfo::Unavailable(_)));
        }
    }

    #[test]
    fn test_bad_dates_are_informational() {
        let timetable = weekly_cse_101();
        let garbled = compute_attendance(
            Some("January"),
            Some("14.01.2025"),
            Some(&timetable),
            AttendanceMode::PerSubject,
        );
        assert_eq!(garbled.message(), BAD_DATES_MESSAGE);

        let inverted = compute_attendance(
            Some("14.01.2025"),
            Some("01.01.2025"),
            Some(&timetable),
            AttendanceMode::PerSubject,
        );
        assert_eq!(inverted.message(), BAD_DATES_MESSAGE);
    }

    #[test]
    fn test_empty_timetable_has_no_subjects() {
        let timetable = Timetable::blank(&DayName::WEEKDAYS, &default_time_slots());
        let info = compute_attendance(
            Some("01.01.2025"),
            Some("31.01.2025"),
            Some(&timetable),
            AttendanceMode::PerSubject,
        );
        let AttendanceInfo::PerSubject(info) = info else {
            panic!("expected per-subject attendance");
        };
        assert!(info.subjects.is_empty());
        assert_eq!(info.working_days, 23);
    }
}
