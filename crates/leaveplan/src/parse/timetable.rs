//! Heuristic timetable extraction from OCR lines.
//!
//! The parser makes a single pass over the normalized lines, tracking the
//! current day and the last matched slot. Lines that carry a time-slot label
//! have their course codes written into that slot. When too few cells are
//! filled that way (typical for grid-shaped tables that OCR flattens into
//! columns), a best-effort positional recovery spreads every course code found
//! in the raw text over the weekday grid, and the result is flagged as
//! [`ParseConfidence::Recovered`].

use super::normalize::clean_text;
use crate::config::ParserConfig;
use crate::model::{
    find_course_matches, Cell, CourseCode, CourseMatch, DayName, ParseConfidence, TimeSlot,
    Timetable, TimetableParse,
};
use chrono::Timelike;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

static TIME_RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s*[:.]\s*(\d{2})\s*(?:(am|pm)\b)?\s*(?:-|to)\s*(\d{1,2})\s*[:.]\s*(\d{2})\s*(?:(am|pm)\b)?",
    )
    .unwrap()
});
static DAY_ABBREVIATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tues?|wed|thu(?:rs?)?|fri|sat|sun)\b\.?").unwrap()
});
static PM_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bpm\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Accumulator threaded through the line scan.
#[derive(Debug, Default)]
struct ScanState {
    /// Day whose rows are being read; `None` before the first day line or
    /// while inside a day that is not part of the configured week.
    current_day: Option<DayName>,
    /// Last slot matched for the current day.
    slot_cursor: Option<TimeSlot>,
}

/// Converts timetable text into a [`Timetable`] over a fixed day/slot grid.
pub struct TimetableParser {
    days: Vec<DayName>,
    slots: Vec<TimeSlot>,
    fallback_threshold: usize,
}

impl TimetableParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            days: config.days.clone(),
            slots: config.time_slots.clone(),
            fallback_threshold: config.fallback_threshold,
        }
    }

    /// Parses normalized `lines`; `raw_text` is only read by the positional
    /// recovery branch.
    pub fn parse(&self, lines: &[String], raw_text: &str) -> TimetableParse {
        let blank = Timetable::blank(&self.days, &self.slots);
        let (mut timetable, _) = lines
            .iter()
            .fold((blank, ScanState::default()), |(timetable, state), line| {
                self.scan_line(timetable, state, line)
            });

        let matched_cells = timetable.filled_count();
        let mut recovered_cells = 0;

        if matched_cells < self.fallback_threshold {
            recovered_cells = self.recover_positionally(&mut timetable, raw_text);
            if recovered_cells > 0 {
                warn!(
                    matched_cells,
                    recovered_cells,
                    threshold = self.fallback_threshold,
                    "Timetable text had little day/slot structure, used positional recovery"
                );
            }
        }

        let confidence = if recovered_cells > 0 {
            ParseConfidence::Recovered
        } else if matched_cells > 0 {
            ParseConfidence::Structured
        } else {
            ParseConfidence::Empty
        };

        debug!(
            lines = lines.len(),
            matched_cells,
            recovered_cells,
            confidence = confidence.as_str(),
            "Parsed timetable"
        );

        TimetableParse {
            timetable,
            confidence,
            matched_cells,
            recovered_cells,
        }
    }

    fn scan_line(
        &self,
        mut timetable: Timetable,
        mut state: ScanState,
        line: &str,
    ) -> (Timetable, ScanState) {
        let mut content = line;

        if let Some((day, rest_at)) = detect_day(line) {
            state.current_day = self.days.contains(&day).then_some(day);
            state.slot_cursor = None;
            content = &line[rest_at..];
        }

        let Some(day) = state.current_day else {
            return (timetable, state);
        };

        let afternoon_hint = PM_WORD_REGEX.is_match(content);
        let tokens: Vec<Captures> = TIME_RANGE_REGEX.captures_iter(content).collect();

        for (i, caps) in tokens.iter().enumerate() {
            let Some(whole) = caps.get(0) else { continue };
            let afternoon = afternoon_hint
                || state
                    .slot_cursor
                    .is_some_and(|slot| slot.starts_after_noon());

            let Some(slot) = self.resolve_slot(caps, afternoon) else {
                debug!(label = whole.as_str(), "Time label does not match a canonical slot");
                continue;
            };
            state.slot_cursor = Some(slot);

            // Course codes belong to the nearest preceding label; text ahead
            // of the first label belongs to the first one.
            let segment_start = if i == 0 { 0 } else { whole.end() };
            let segment_end = tokens
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(content.len(), |m| m.start());
            let segment = if i == 0 {
                format!("{} {}", &content[..whole.start()], &content[whole.end()..segment_end])
            } else {
                content[segment_start..segment_end].to_string()
            };

            let courses = find_course_matches(&segment);
            if !courses.is_empty() {
                let joined = courses
                    .iter()
                    .map(CourseMatch::label)
                    .collect::<Vec<_>>()
                    .join(", ");
                timetable.set(day, slot, Cell::Class(joined));
            }
        }

        (timetable, state)
    }

    /// Turns a captured `H:MM-H:MM` label into a canonical slot, shifting
    /// 12-hour afternoon hours onto the 24-hour clock where needed.
    fn resolve_slot(&self, caps: &Captures, afternoon: bool) -> Option<TimeSlot> {
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let meridiem = |i: usize| {
            caps.get(i).map(|m| {
                if m.as_str().eq_ignore_ascii_case("pm") {
                    Meridiem::Pm
                } else {
                    Meridiem::Am
                }
            })
        };

        let (start_hr, start_min) = (number(1)?, number(2)?);
        let (end_hr, end_min) = (number(4)?, number(5)?);
        let start_mer = meridiem(3);
        // A meridiem on the start ("01:00 pm-02:00") carries over to the end.
        let end_mer = meridiem(6).or(start_mer);

        let start_hr = self.to_24_hour(start_hr, start_mer, afternoon);
        let mut end_hr = self.to_24_hour(end_hr, end_mer, afternoon || start_hr >= 12);
        if end_hr < start_hr && end_hr + 12 <= self.day_end_hour() {
            end_hr += 12;
        }

        let slot = TimeSlot::from_hm(start_hr, start_min, end_hr, end_min)?;
        self.slots.contains(&slot).then_some(slot)
    }

    fn to_24_hour(&self, hour: u32, meridiem: Option<Meridiem>, afternoon: bool) -> u32 {
        match meridiem {
            Some(Meridiem::Pm) if hour < 12 => hour + 12,
            Some(Meridiem::Am) if hour == 12 => 0,
            Some(_) => hour,
            None => {
                let before_day_start = hour < self.day_start_hour();
                let shifted_fits = hour + 12 <= self.day_end_hour();
                if hour < 12 && (afternoon || before_day_start) && shifted_fits {
                    hour + 12
                } else {
                    hour
                }
            }
        }
    }

    fn day_start_hour(&self) -> u32 {
        self.slots.first().map_or(0, |s| s.start.hour())
    }

    fn day_end_hour(&self) -> u32 {
        self.slots.last().map_or(23, |s| s.end.hour())
    }

    /// Best-effort recovery: every course code in the raw text, in reading
    /// order, is written into the next free cell of the weekday x
    /// first-half-of-slots grid, day-major. Cells already filled by the line
    /// scan are kept, as are the codes placed there. Codes that do not fit
    /// once the grid is full are dropped. Returns the number of cells filled.
    fn recover_positionally(&self, timetable: &mut Timetable, raw_text: &str) -> usize {
        let placed: HashSet<CourseCode> = timetable
            .cells()
            .flat_map(|(_, _, cell)| find_course_matches(cell.as_str()))
            .map(|m| m.code)
            .collect();

        let leftovers: Vec<CourseMatch> = find_course_matches(&clean_text(raw_text))
            .into_iter()
            .filter(|m| !placed.contains(&m.code))
            .collect();

        let half = (self.slots.len() / 2).max(1).min(self.slots.len());
        let grid: Vec<(DayName, TimeSlot)> = self
            .days
            .iter()
            .filter(|day| !day.is_weekend())
            .flat_map(|day| self.slots[..half].iter().map(move |slot| (*day, *slot)))
            .collect();

        let free: Vec<(DayName, TimeSlot)> = grid
            .into_iter()
            .filter(|(day, slot)| timetable.get(*day, slot).is_some_and(Cell::is_free))
            .collect();
        if leftovers.len() > free.len() {
            warn!(
                unplaced = leftovers.len() - free.len(),
                "Recovery grid is full, some course codes were not placed"
            );
        }

        let mut filled = 0;
        for ((day, slot), course) in free.into_iter().zip(leftovers) {
            timetable.set(day, slot, Cell::Class(course.label()));
            filled += 1;
        }
        filled
    }
}

/// Finds the day a line names. Full names may appear anywhere (earliest
/// wins); abbreviations only count at the start of the line. Returns the
/// day and the byte offset where the rest of the line begins.
fn detect_day(line: &str) -> Option<(DayName, usize)> {
    let lower = line.to_ascii_lowercase();
    let full = DayName::ALL
        .into_iter()
        .filter_map(|day| {
            lower
                .find(day.lowercase_name())
                .map(|at| (at, day, at + day.lowercase_name().len()))
        })
        .min_by_key(|(at, _, _)| *at)
        .map(|(_, day, end)| (day, end));

    full.or_else(|| {
        let m = DAY_ABBREVIATION_REGEX.find(line)?;
        let day = DayName::from_name(&line[..3])?;
        Some((day, m.end()))
    })
}
