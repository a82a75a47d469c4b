//! Derived artifacts: weekly summary, attendance budget, leave suggestions.

mod attendance;
mod leave;
mod summary;

pub use attendance::{
    attendance_figures, compute_attendance, total_weeks, working_days, AttendanceMode,
    MIN_ATTENDANCE_PERCENT,
};
pub use leave::LeaveOptimizer;
pub use summary::{summarize, weekly_class_count};

use crate::config::PlannerConfig;
use crate::model::{AcademicCalendar, AttendanceInfo, LeaveSuggestion, Timetable};
use serde::{Deserialize, Serialize};

/// Leave suggestions plus the attendance budget they have to respect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeavePlan {
    pub strategic_leaves: Vec<LeaveSuggestion>,
    pub attendance_info: AttendanceInfo,
}

/// Combines the leave optimizer and the attendance calculator.
#[derive(Debug, Clone, Default)]
pub struct LeavePlanner {
    config: PlannerConfig,
}

impl LeavePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn attendance_mode(&self) -> AttendanceMode {
        self.config.attendance_mode
    }

    pub fn plan(&self, calendar: &AcademicCalendar, timetable: Option<&Timetable>) -> LeavePlan {
        let strategic_leaves =
            LeaveOptimizer::new(self.config.holidays_only).optimize(&calendar.entries);
        let attendance_info = compute_attendance(
            calendar.start_date.as_deref(),
            calendar.end_date.as_deref(),
            timetable,
            self.config.attendance_mode,
        );
        LeavePlan {
            strategic_leaves,
            attendance_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_time_slots, CalendarEntry, Cell, DayName};

    #[test]
    fn test_plan_without_semester_dates() {
        let calendar = AcademicCalendar {
            user_id: "default_user".to_string(),
            entries: vec![CalendarEntry::new("02.01.2025", "Thursday", None)],
            start_date: None,
            end_date: None,
        };
        let plan = LeavePlanner::default().plan(&calendar, None);
        assert_eq!(plan.strategic_leaves.len(), 1);
        assert!(matches!(plan.attendance_info, AttendanceInfo::Unavailable(_)));

        let json = serde_json::to_value(&plan).unwrap();
        assert!(json["strategicLeaves"].is_array());
        assert!(json["attendanceInfo"]["message"].is_string());
    }

    #[test]
    fn test_plan_with_aggregate_attendance() {
        let slots = default_time_slots();
        let mut timetable = Timetable::blank(&DayName::WEEKDAYS, &slots);
        timetable.set(DayName::Monday, slots[0], Cell::Class("CSE 101".to_string()));
        let calendar = AcademicCalendar {
            user_id: "u1".to_string(),
            entries: vec![],
            start_date: Some("06.01.2025".to_string()),
            end_date: Some("10.01.2025".to_string()),
        };
        let planner = LeavePlanner::new(PlannerConfig {
            holidays_only: false,
            attendance_mode: AttendanceMode::Aggregate,
        });
        let plan = planner.plan(&calendar, Some(&timetable));
        assert!(plan.strategic_leaves.is_empty());
        let AttendanceInfo::Aggregate(info) = plan.attendance_info else {
            panic!("expected aggregate attendance");
        };
        assert_eq!(info.figures.total_classes, 1);
        assert_eq!(info.figures.min_attendance_required, 1);
    }
}
