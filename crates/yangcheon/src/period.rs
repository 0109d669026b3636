//! Bell schedule and "is this slot happening now" checks.
//!
//! Weekday columns are 1-based: column 1 is Monday, column 5 is Friday.
//! Periods are 1-based as well and map onto the fixed school bell schedule,
//! independent of whatever numbering the schedule backend uses.

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Weekday};

/// Number of periods in a school day.
pub const PERIOD_COUNT: u8 = 7;

/// Number of weekday columns in the timetable (Monday through Friday).
pub const WEEKDAY_COUNT: u8 = 5;

/// Start and end of each period, in `HH:MM`.
const PERIOD_TIMES: [(&str, &str); PERIOD_COUNT as usize] = [
    ("08:20", "09:10"),
    ("09:20", "10:10"),
    ("10:20", "11:10"),
    ("11:20", "12:10"),
    ("13:10", "14:00"),
    ("14:10", "15:00"),
    ("15:10", "16:00"),
];

const WEEKDAY_LABELS: [&str; WEEKDAY_COUNT as usize] = ["월", "화", "수", "목", "금"];

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Returns the `(start, end)` wall-clock window of a period.
pub fn period_window(period: u8) -> Option<(NaiveTime, NaiveTime)> {
    let index = usize::from(period).checked_sub(1)?;
    let (start, end) = PERIOD_TIMES.get(index)?;
    let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
    Some((start, end))
}

/// Returns the `HH:MM` start and end strings of a period.
pub fn period_time_strings(period: u8) -> Option<(&'static str, &'static str)> {
    let index = usize::from(period).checked_sub(1)?;
    PERIOD_TIMES.get(index).copied()
}

/// Maps a timetable column to its calendar weekday.
pub fn column_weekday(column: u8) -> Option<Weekday> {
    match column {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        _ => None,
    }
}

/// Maps a calendar weekday back to its timetable column.
pub fn weekday_column(weekday: Weekday) -> Option<u8> {
    match weekday {
        Weekday::Sat | Weekday::Sun => None,
        other => Some(other.number_from_monday() as u8),
    }
}

/// Short Korean label of a column ("월" for Monday, ...).
pub fn weekday_label(column: u8) -> Option<&'static str> {
    let index = usize::from(column).checked_sub(1)?;
    WEEKDAY_LABELS.get(index).copied()
}

/// Returns true iff `now` falls on the column's weekday and inside the
/// period's `[start, end]` window.
///
/// Out-of-range periods or columns are never current.
pub fn is_current_period(period: u8, column: u8, now: NaiveDateTime) -> bool {
    let Some(weekday) = column_weekday(column) else {
        return false;
    };
    if now.weekday() != weekday {
        return false;
    }

    match period_window(period) {
        Some((start, end)) => {
            let time = now.time();
            time >= start && time <= end
        }
        None => false,
    }
}

/// Returns the `(column, period)` slot running at `now`, if any.
pub fn current_slot(now: NaiveDateTime) -> Option<(u8, u8)> {
    let column = weekday_column(now.weekday())?;
    (1..=PERIOD_COUNT)
        .find(|&period| is_current_period(period, column, now))
        .map(|period| (column, period))
}
