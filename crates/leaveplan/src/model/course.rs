//! Course-code recognition shared by the timetable parser and the reducers.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// Department prefix in any case, optional space or hyphen, 3-4 digit number
// with an optional letter, then an optional parenthesised room/section token.
// Two-digit numbers are not accepted: "to 10:00" would read as a course.
static COURSE_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{2,4})[ \t-]?(\d{3,4}[a-z]?)\b(?:\s*\(([^()]{1,16})\))?").unwrap()
});

/// Tokens (uppercased) that look like a department prefix but never are.
const NOT_A_DEPARTMENT: &[&str] = &[
    "MON", "TUE", "TUES", "WED", "THU", "THUR", "THRS", "FRI", "SAT", "SUN", "AM", "PM", "RM",
    "ROOM", "AND", "THE", "FOR", "TO", "AT", "IN", "ON", "OF", "BY", "FROM", "TILL", "UPTO",
];

/// A department prefix plus course number, e.g. `CSE 101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseCode {
    pub department: String,
    pub number: String,
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.department, self.number)
    }
}

/// One course-code occurrence in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseMatch {
    pub code: CourseCode,
    pub room: Option<String>,
}

impl CourseMatch {
    /// Text written into a timetable cell: `CSE 101` or `CSE 101 (R301)`.
    pub fn label(&self) -> String {
        match &self.room {
            Some(room) => format!("{} ({})", self.code, room),
            None => self.code.to_string(),
        }
    }
}

/// Finds every course code in `text`, in order of appearance. Codes are
/// uppercased, so `cse 101` and `CSE 101` are the same course.
pub fn find_course_matches(text: &str) -> Vec<CourseMatch> {
    COURSE_CODE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let department = caps.get(1)?.as_str().to_ascii_uppercase();
            if NOT_A_DEPARTMENT.contains(&department.as_str()) {
                return None;
            }
            Some(CourseMatch {
                code: CourseCode {
                    department,
                    number: caps.get(2)?.as_str().to_ascii_uppercase(),
                },
                room: caps
                    .get(3)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|r| !r.is_empty()),
            })
        })
        .collect()
}

/// Distinct course codes listed in one timetable cell, in order of
/// appearance. Room suffixes are ignored.
pub fn course_codes_in(cell: &str) -> Vec<CourseCode> {
    let mut codes: Vec<CourseCode> = Vec::new();
    for found in find_course_matches(cell) {
        if !codes.contains(&found.code) {
            codes.push(found.code);
        }
    }
    codes
}
