//! Shared data model: days, slots, course codes, dates and the records
//! exchanged between the parsers, the planner and the store.

mod course;
mod date;
mod slot;
mod types;

pub use course::{course_codes_in, find_course_matches, CourseCode, CourseMatch};
pub use date::{format_dotted, parse_dotted, parse_flexible, to_dotted, DOTTED_DATE_FORMAT};
pub use slot::{default_time_slots, DayName, SlotParseError, TimeSlot};
pub use types::*;
