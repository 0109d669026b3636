//! Elective placeholder substitution.
//!
//! Timetables list some lessons under a placeholder ("탐구B", "A 반") that
//! stands in for whichever elective the user actually takes. The user's pick
//! is stored as `"subject/room"` and replaces both lines of the cell.

use super::types::{AppVariant, LessonEntry};
use serde::Serialize;
use std::collections::HashMap;

/// Stored values meaning "nothing chosen".
pub const NO_SELECTION: [&str; 2] = ["없음", "선택 없음"];

/// Placeholder token -> stored override string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectOverrideMap {
    entries: HashMap<String, String>,
}

impl SubjectOverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(token.into(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubjectOverrideMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (token, value) in iter {
            map.insert(token, value);
        }
        map
    }
}

/// What a timetable cell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCell {
    pub subject: String,
    /// Room for teacher timetables, teacher for class timetables
    pub secondary: String,
}

/// Resolves the two lines shown for `entry`.
///
/// Malformed or sentinel overrides silently fall back to the raw entry.
pub fn resolve_display(
    entry: &LessonEntry,
    overrides: &SubjectOverrideMap,
    variant: AppVariant,
) -> DisplayCell {
    let substituted = variant
        .is_placeholder(&entry.subject)
        .then(|| overrides.get(&entry.subject))
        .flatten()
        .filter(|value| is_active_override(value, &entry.subject))
        .and_then(split_override);

    match substituted {
        Some((subject, secondary)) => DisplayCell {
            subject: subject.to_string(),
            secondary: secondary.to_string(),
        },
        None => DisplayCell {
            subject: entry.subject.clone(),
            secondary: entry.room_or_teacher.clone(),
        },
    }
}

fn is_active_override(value: &str, token: &str) -> bool {
    !value.is_empty() && !NO_SELECTION.contains(&value) && value != token
}

/// Splits `"subject/room"`; anything but exactly two parts is rejected.
pub fn split_override(value: &str) -> Option<(&str, &str)> {
    let mut parts = value.split('/');
    let subject = parts.next()?;
    let secondary = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((subject, secondary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(subject: &str, room_or_teacher: &str) -> LessonEntry {
        LessonEntry {
            weekday: 1,
            period: 1,
            subject: subject.to_string(),
            room_or_teacher: room_or_teacher.to_string(),
            weekday_string: "월".to_string(),
        }
    }

    fn cell(subject: &str, secondary: &str) -> DisplayCell {
        DisplayCell {
            subject: subject.to_string(),
            secondary: secondary.to_string(),
        }
    }

    #[test]
    fn test_student_override_applies() {
        let overrides: SubjectOverrideMap = [("탐구B", "화학I/203")].into_iter().collect();
        let resolved = resolve_display(&entry("탐구B", "201"), &overrides, AppVariant::Student);
        assert_eq!(resolved, cell("화학I", "203"));
    }

    #[test]
    fn test_regular_subject_passes_through() {
        let resolved = resolve_display(
            &entry("물리I", "202"),
            &SubjectOverrideMap::new(),
            AppVariant::Student,
        );
        assert_eq!(resolved, cell("물리I", "202"));
    }

    #[test]
    fn test_malformed_overrides_fall_back() {
        for value in ["화학I", "화학I/203/extra", "a/b/c/d", ""] {
            let overrides: SubjectOverrideMap = [("탐구C", value)].into_iter().collect();
            let resolved =
                resolve_display(&entry("탐구C", "201"), &overrides, AppVariant::Student);
            assert_eq!(resolved, cell("탐구C", "201"), "override {value:?}");
        }
    }

    #[test]
    fn test_sentinels_and_self_reference_fall_back() {
        for value in ["없음", "선택 없음", "A 반"] {
            let overrides: SubjectOverrideMap = [("A 반", value)].into_iter().collect();
            let resolved = resolve_display(&entry("A 반", "201"), &overrides, AppVariant::Teacher);
            assert_eq!(resolved, cell("A 반", "201"));
        }
    }

    #[test]
    fn test_teacher_class_group_override() {
        let overrides: SubjectOverrideMap = [("E 반", "여지/다목적실A")].into_iter().collect();
        let resolved = resolve_display(&entry("E 반", "209"), &overrides, AppVariant::Teacher);
        assert_eq!(resolved, cell("여지", "다목적실A"));
    }

    #[test]
    fn test_override_ignored_for_non_placeholder() {
        let overrides: SubjectOverrideMap = [("국어", "수학/101")].into_iter().collect();
        let resolved = resolve_display(&entry("국어", "김"), &overrides, AppVariant::Teacher);
        assert_eq!(resolved, cell("국어", "김"));
    }

    #[test]
    fn test_variant_decides_placeholder_set() {
        let overrides: SubjectOverrideMap = [("탐구B", "화학I/203")].into_iter().collect();
        let resolved = resolve_display(&entry("탐구B", "201"), &overrides, AppVariant::Teacher);
        assert_eq!(resolved, cell("탐구B", "201"));
    }

    #[test]
    fn test_split_override() {
        assert_eq!(split_override("기하/207"), Some(("기하", "207")));
        assert_eq!(split_override("/207"), Some(("", "207")));
        assert_eq!(split_override("기하"), None);
        assert_eq!(split_override("a/b/c"), None);
    }
}
