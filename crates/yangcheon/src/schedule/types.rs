/// Types for timetable data
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::period::{PERIOD_COUNT, WEEKDAY_COUNT};

/// Grades offered by the school.
pub const GRADES: RangeInclusive<u8> = 1..=3;

/// Homeroom classes per grade.
pub const CLASSES: RangeInclusive<u8> = 1..=11;

/// Raw lesson object as served by the schedule backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    #[serde(default)]
    pub grade: i32,

    #[serde(rename = "class", default)]
    pub class_number: i32,

    #[serde(default)]
    pub weekday: i32,

    #[serde(default)]
    pub weekday_string: String,

    #[serde(default)]
    pub class_time: i32,

    /// Room number for teacher timetables, teacher name for class timetables
    #[serde(default)]
    pub teacher: String,

    #[serde(default)]
    pub subject: String,
}

/// Entry of the `/teachers` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub grade: Option<i32>,
    #[serde(default)]
    pub class_number: Option<i32>,
}

/// A lesson placed in the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonEntry {
    /// 1 = Monday .. 5 = Friday
    pub weekday: u8,
    /// 1..=7
    pub period: u8,
    pub subject: String,
    pub room_or_teacher: String,
    pub weekday_string: String,
}

/// Weekly timetable: 5 day columns of 7 period slots each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleGrid {
    columns: Vec<Vec<Option<LessonEntry>>>,
}

impl ScheduleGrid {
    /// Creates a grid with every slot empty.
    pub fn empty() -> Self {
        Self {
            columns: (0..WEEKDAY_COUNT)
                .map(|_| vec![None; PERIOD_COUNT as usize])
                .collect(),
        }
    }

    /// Builds a grid from the backend's array-of-arrays.
    ///
    /// The outer index is the day column and the inner index the period row.
    /// Slots past Friday or past the seventh period are dropped, and lessons
    /// with a blank subject are left empty.
    pub fn from_days(days: Vec<Vec<ScheduleItem>>) -> Self {
        let mut grid = Self::empty();

        for (column_index, day) in days.into_iter().take(WEEKDAY_COUNT as usize).enumerate() {
            for (row_index, item) in day.into_iter().take(PERIOD_COUNT as usize).enumerate() {
                if item.subject.trim().is_empty() {
                    continue;
                }
                grid.columns[column_index][row_index] = Some(LessonEntry {
                    weekday: column_index as u8 + 1,
                    period: row_index as u8 + 1,
                    subject: item.subject,
                    room_or_teacher: item.teacher,
                    weekday_string: item.weekday_string,
                });
            }
        }

        grid
    }

    /// Returns the lesson at a 1-based column and period.
    pub fn get(&self, column: u8, period: u8) -> Option<&LessonEntry> {
        let column = usize::from(column).checked_sub(1)?;
        let period = usize::from(period).checked_sub(1)?;
        self.columns.get(column)?.get(period)?.as_ref()
    }

    /// Iterates over every filled slot, column by column.
    pub fn entries(&self) -> impl Iterator<Item = &LessonEntry> {
        self.columns.iter().flatten().flatten()
    }

    /// Returns true if no slot holds a lesson.
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.entries().count()
    }
}

impl Default for ScheduleGrid {
    fn default() -> Self {
        Self::empty()
    }
}

/// A student's homeroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeClass {
    grade: u8,
    class: u8,
}

impl GradeClass {
    /// Returns `None` unless grade is 1..=3 and class is 1..=11.
    pub fn new(grade: u8, class: u8) -> Option<Self> {
        (GRADES.contains(&grade) && CLASSES.contains(&class)).then_some(Self { grade, class })
    }

    pub fn grade(&self) -> u8 {
        self.grade
    }

    pub fn class(&self) -> u8 {
        self.class
    }

    /// Push-messaging topic of this homeroom, e.g. `"2-3"`.
    pub fn topic(&self) -> String {
        self.to_string()
    }

    /// Every homeroom of the school, grade-major.
    pub fn all() -> impl Iterator<Item = GradeClass> {
        GRADES.flat_map(|grade| CLASSES.map(move |class| GradeClass { grade, class }))
    }
}

impl Default for GradeClass {
    fn default() -> Self {
        Self { grade: 1, class: 1 }
    }
}

impl fmt::Display for GradeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.grade, self.class)
    }
}

/// What a timetable is fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    GradeClass(GradeClass),
    TeacherId(String),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::GradeClass(gc) => write!(f, "class {gc}"),
            IdentityKey::TeacherId(id) => write!(f, "teacher {id}"),
        }
    }
}

/// Which of the two apps is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppVariant {
    #[default]
    Student,
    Teacher,
}

/// Elective placeholders that appear in student timetables.
pub const STUDENT_PLACEHOLDERS: [&str; 3] = ["탐구B", "탐구C", "탐구D"];

/// Marker of a class-group placeholder in teacher timetables ("A 반", ...).
pub const CLASS_GROUP_MARKER: &str = "반";

impl AppVariant {
    /// Returns true if `subject` stands in for a user-chosen elective.
    pub fn is_placeholder(&self, subject: &str) -> bool {
        match self {
            AppVariant::Student => STUDENT_PLACEHOLDERS.contains(&subject),
            AppVariant::Teacher => subject.contains(CLASS_GROUP_MARKER),
        }
    }

    /// Preference key under which the override for `token` is stored.
    ///
    /// Student keys are `selectedSubjectB` .. `selectedSubjectD`, teacher
    /// keys are `selected{token}Subject`.
    pub fn override_key(&self, token: &str) -> String {
        match self {
            AppVariant::Student => {
                let suffix = token.strip_prefix("탐구").unwrap_or(token);
                format!("selectedSubject{suffix}")
            }
            AppVariant::Teacher => format!("selected{token}Subject"),
        }
    }
}

impl std::str::FromStr for AppVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(AppVariant::Student),
            "teacher" => Ok(AppVariant::Teacher),
            other => Err(format!("unknown app variant: {other}")),
        }
    }
}
