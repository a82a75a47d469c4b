use crate::model::{course_codes_in, Timetable};
use std::collections::BTreeMap;

/// Weekly class count per course code (`"CSE 101"` style keys).
///
/// A cell holding two courses counts once for each. Free cells and text
/// without a recognizable course code contribute nothing.
pub fn summarize(timetable: &Timetable) -> BTreeMap<String, u32> {
    timetable
        .cells()
        .filter(|(_, _, cell)| !cell.is_free())
        .flat_map(|(_, _, cell)| course_codes_in(cell.as_str()))
        .fold(BTreeMap::new(), |mut counts, code| {
            *counts.entry(code.to_string()).or_insert(0) += 1;
            counts
        })
}

/// Number of occupied cells per week, regardless of course.
pub fn weekly_class_count(timetable: &Timetable) -> u32 {
    timetable.filled_count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_time_slots, Cell, DayName};

    fn timetable_with(cells: &[(DayName, usize, &str)]) -> Timetable {
        let slots = default_time_slots();
        let mut timetable = Timetable::blank(&DayName::WEEKDAYS, &slots);
        for (day, slot, text) in cells {
            timetable.set(*day, slots[*slot], Cell::Class(text.to_string()));
        }
        timetable
    }

    #[test]
    fn test_one_course_every_weekday() {
        let timetable = timetable_with(&[
            (DayName::Monday, 0, "CSE 101"),
            (DayName::Tuesday, 1, "CSE 101"),
            (DayName::Wednesday, 2, "CSE 101"),
            (DayName::Thursday, 3, "CSE 101"),
            (DayName::Friday, 4, "CSE 101"),
        ]);
        let summary = summarize(&timetable);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary["CSE 101"], 5);
        assert_eq!(weekly_class_count(&timetable), 5);
    }

    #[test]
    fn test_shared_cell_counts_for_each_course() {
        let timetable = timetable_with(&[
            (DayName::Monday, 0, "CSE 101 (R301), MAT 202"),
            (DayName::Monday, 1, "MAT202"),
            (DayName::Friday, 7, "Library hour"),
        ]);
        let summary = summarize(&timetable);
        assert_eq!(summary["CSE 101"], 1);
        assert_eq!(summary["MAT 202"], 2);
        assert_eq!(summary.len(), 2);
        assert_eq!(weekly_class_count(&timetable), 3);
    }

    #[test]
    fn test_blank_timetable_is_empty() {
        let timetable = Timetable::blank(&DayName::WEEKDAYS, &default_time_slots());
        assert!(summarize(&timetable).is_empty());
        assert_eq!(weekly_class_count(&timetable), 0);
    }
}
