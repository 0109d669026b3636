//! Typed access to the settings both apps persist.

use super::{PreferenceError, PreferenceStore};
use crate::messaging::{SubscriptionTask, TopicManager};
use crate::schedule::{AppVariant, GradeClass, IdentityKey, ScheduleGrid, SubjectOverrideMap, Teacher};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Preference keys shared with the phone apps.
pub mod keys {
    pub const DEFAULT_GRADE: &str = "defaultGrade";
    pub const DEFAULT_CLASS: &str = "defaultClass";
    pub const SELECTED_TEACHER_ID: &str = "selectedTeacherId";
    pub const SELECTED_TEACHER_NAME: &str = "selectedTeacherName";
    pub const SELECTED_TEACHER_SUBJECT: &str = "selectedTeacherSubject";
    pub const NOTIFICATIONS_ENABLED: &str = "notificationsEnabled";
    pub const CELL_BACKGROUND_COLOR: &str = "cellBackgroundColor";
    pub const INITIAL_SETUP_COMPLETED: &str = "initialSetupCompleted";
}

/// The teacher picked in the teacher app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherSelection {
    pub id: String,
    pub name: String,
    pub subject: Option<String>,
}

/// Settings facade over an injected [`PreferenceStore`].
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn PreferenceStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }

    /// Selected homeroom, if one was ever stored and is in range.
    pub fn stored_grade_class(&self) -> Result<Option<GradeClass>, PreferenceError> {
        if self.store.get_raw(keys::DEFAULT_GRADE)?.is_none() {
            return Ok(None);
        }
        let grade = self.store.get_int(keys::DEFAULT_GRADE, 1)?;
        let class = self.store.get_int(keys::DEFAULT_CLASS, 1)?;

        Ok(u8::try_from(grade)
            .ok()
            .zip(u8::try_from(class).ok())
            .and_then(|(grade, class)| GradeClass::new(grade, class)))
    }

    /// Selected homeroom, falling back to 1-1.
    pub fn grade_class(&self) -> Result<GradeClass, PreferenceError> {
        Ok(self.stored_grade_class()?.unwrap_or_default())
    }

    pub fn set_grade_class(&self, selection: GradeClass) -> Result<(), PreferenceError> {
        self.store
            .put_int(keys::DEFAULT_GRADE, i64::from(selection.grade()))?;
        self.store
            .put_int(keys::DEFAULT_CLASS, i64::from(selection.class()))
    }

    /// Stores a new homeroom and moves the notification topic along.
    ///
    /// Returns the topic task when notifications are enabled.
    pub fn change_class(
        &self,
        new: GradeClass,
        topics: &TopicManager,
    ) -> Result<Option<SubscriptionTask>, PreferenceError> {
        let old = self.stored_grade_class()?;
        self.set_grade_class(new)?;
        info!(grade = new.grade(), class = new.class(), "Class selection changed");

        if !self.notifications_enabled()? {
            debug!("Notifications disabled, leaving topics alone");
            return Ok(None);
        }
        Ok(Some(topics.update_subscription(old.as_ref(), &new)))
    }

    pub fn teacher(&self) -> Result<Option<TeacherSelection>, PreferenceError> {
        let Some(id) = self.store.get_string(keys::SELECTED_TEACHER_ID)? else {
            return Ok(None);
        };
        Ok(Some(TeacherSelection {
            id,
            name: self
                .store
                .get_string(keys::SELECTED_TEACHER_NAME)?
                .unwrap_or_default(),
            subject: self.store.get_string(keys::SELECTED_TEACHER_SUBJECT)?,
        }))
    }

    pub fn set_teacher(&self, teacher: &Teacher) -> Result<(), PreferenceError> {
        self.store.put_string(keys::SELECTED_TEACHER_ID, &teacher.id)?;
        self.store
            .put_string(keys::SELECTED_TEACHER_NAME, &teacher.name)?;
        match &teacher.subject {
            Some(subject) => self
                .store
                .put_string(keys::SELECTED_TEACHER_SUBJECT, subject),
            None => self.store.remove(keys::SELECTED_TEACHER_SUBJECT),
        }
    }

    /// What the timetable should be fetched for.
    ///
    /// The teacher app has no key until a teacher was picked.
    pub fn identity_key(&self, variant: AppVariant) -> Result<Option<IdentityKey>, PreferenceError> {
        match variant {
            AppVariant::Student => Ok(Some(IdentityKey::GradeClass(self.grade_class()?))),
            AppVariant::Teacher => Ok(self.teacher()?.map(|t| IdentityKey::TeacherId(t.id))),
        }
    }

    pub fn override_value(
        &self,
        variant: AppVariant,
        token: &str,
    ) -> Result<Option<String>, PreferenceError> {
        self.store.get_string(&variant.override_key(token))
    }

    pub fn set_override(
        &self,
        variant: AppVariant,
        token: &str,
        value: &str,
    ) -> Result<(), PreferenceError> {
        debug!(token = %token, value = %value, "Storing subject override");
        self.store.put_string(&variant.override_key(token), value)
    }

    /// Collects the stored override of every placeholder found in `grid`.
    pub fn overrides_for(
        &self,
        grid: &ScheduleGrid,
        variant: AppVariant,
    ) -> Result<SubjectOverrideMap, PreferenceError> {
        let tokens: BTreeSet<&str> = grid
            .entries()
            .map(|entry| entry.subject.as_str())
            .filter(|subject| variant.is_placeholder(subject))
            .collect();

        let mut overrides = SubjectOverrideMap::new();
        for token in tokens {
            if let Some(value) = self.override_value(variant, token)? {
                overrides.insert(token, value);
            }
        }
        Ok(overrides)
    }

    pub fn notifications_enabled(&self) -> Result<bool, PreferenceError> {
        self.store.get_bool(keys::NOTIFICATIONS_ENABLED, true)
    }

    /// Flips the notification toggle and (un)subscribes the current topic.
    pub fn set_notifications_enabled(
        &self,
        enabled: bool,
        topics: &TopicManager,
    ) -> Result<SubscriptionTask, PreferenceError> {
        self.store.put_bool(keys::NOTIFICATIONS_ENABLED, enabled)?;
        let current = self.grade_class()?;

        Ok(if enabled {
            topics.subscribe_current(&current)
        } else {
            topics.unsubscribe_current(&current)
        })
    }

    /// Packed ARGB color of timetable cells.
    pub fn cell_background_color(&self) -> Result<Option<u32>, PreferenceError> {
        let Some(raw) = self.store.get_raw(keys::CELL_BACKGROUND_COLOR)? else {
            return Ok(None);
        };
        match raw.parse::<i64>() {
            // The phone apps store the color as a signed 32-bit int.
            Ok(value) => Ok(u32::try_from(value)
                .ok()
                .or_else(|| i32::try_from(value).ok().map(|v| v as u32))),
            Err(_) => {
                warn!(value = %raw, "Ignoring malformed cell color");
                Ok(None)
            }
        }
    }

    pub fn set_cell_background_color(&self, argb: u32) -> Result<(), PreferenceError> {
        self.store
            .put_int(keys::CELL_BACKGROUND_COLOR, i64::from(argb))
    }

    pub fn initial_setup_completed(&self) -> Result<bool, PreferenceError> {
        self.store.get_bool(keys::INITIAL_SETUP_COMPLETED, false)
    }

    pub fn complete_initial_setup(&self) -> Result<(), PreferenceError> {
        self.store.put_bool(keys::INITIAL_SETUP_COMPLETED, true)
    }

    /// Drops every stored setting.
    pub fn reset(&self) -> Result<(), PreferenceError> {
        info!("Resetting all settings");
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::testing::RecordingBroker;
    use crate::messaging::TopicAction;
    use crate::prefs::MemoryPreferences;
    use crate::schedule::{ScheduleItem, NO_SELECTION};

    fn settings() -> Settings {
        Settings::new(Arc::new(MemoryPreferences::new()))
    }

    fn gc(grade: u8, class: u8) -> GradeClass {
        GradeClass::new(grade, class).unwrap()
    }

    fn item(subject: &str, teacher: &str) -> ScheduleItem {
        ScheduleItem {
            grade: 2,
            class_number: 3,
            weekday: 0,
            weekday_string: "월".to_string(),
            class_time: 1,
            teacher: teacher.to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let settings = settings();
        assert_eq!(settings.stored_grade_class().unwrap(), None);
        assert_eq!(settings.grade_class().unwrap(), gc(1, 1));
        assert!(settings.notifications_enabled().unwrap());
        assert!(!settings.initial_setup_completed().unwrap());
        assert_eq!(settings.cell_background_color().unwrap(), None);
        assert_eq!(settings.teacher().unwrap(), None);
        assert_eq!(settings.identity_key(AppVariant::Teacher).unwrap(), None);
    }

    #[test]
    fn test_grade_class_uses_app_keys() {
        let settings = settings();
        settings.set_grade_class(gc(2, 3)).unwrap();

        assert_eq!(settings.store().get_int(keys::DEFAULT_GRADE, 0).unwrap(), 2);
        assert_eq!(settings.store().get_int(keys::DEFAULT_CLASS, 0).unwrap(), 3);
        assert_eq!(
            settings.identity_key(AppVariant::Student).unwrap(),
            Some(IdentityKey::GradeClass(gc(2, 3)))
        );
    }

    #[test]
    fn test_out_of_range_selection_is_ignored() {
        let settings = settings();
        settings.store().put_int(keys::DEFAULT_GRADE, 5).unwrap();
        assert_eq!(settings.stored_grade_class().unwrap(), None);
        assert_eq!(settings.grade_class().unwrap(), gc(1, 1));
    }

    #[test]
    fn test_teacher_selection() {
        let settings = settings();
        settings
            .set_teacher(&Teacher {
                id: "T042".to_string(),
                name: "김선생".to_string(),
                subject: Some("물리".to_string()),
                grade: None,
                class_number: None,
            })
            .unwrap();

        let teacher = settings.teacher().unwrap().unwrap();
        assert_eq!(teacher.name, "김선생");
        assert_eq!(teacher.subject.as_deref(), Some("물리"));
        assert_eq!(
            settings.identity_key(AppVariant::Teacher).unwrap(),
            Some(IdentityKey::TeacherId("T042".to_string()))
        );
    }

    #[test]
    fn test_overrides_for_grid_only_reads_placeholders() {
        let settings = settings();
        settings
            .set_override(AppVariant::Student, "탐구B", "화학I/203")
            .unwrap();
        settings
            .set_override(AppVariant::Student, "탐구D", NO_SELECTION[0])
            .unwrap();
        assert_eq!(
            settings.store().get_string("selectedSubjectB").unwrap().as_deref(),
            Some("화학I/203")
        );

        let grid = ScheduleGrid::from_days(vec![vec![
            item("탐구B", "201"),
            item("국어", "김"),
            item("탐구C", "202"),
        ]]);
        let overrides = settings.overrides_for(&grid, AppVariant::Student).unwrap();

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get("탐구B"), Some("화학I/203"));
    }

    #[test]
    fn test_cell_color_accepts_signed_storage() {
        let settings = settings();
        settings.set_cell_background_color(0xFFBBDEFB).unwrap();
        assert_eq!(settings.cell_background_color().unwrap(), Some(0xFFBBDEFB));

        settings
            .store()
            .put_int(keys::CELL_BACKGROUND_COLOR, -4464901)
            .unwrap();
        assert_eq!(settings.cell_background_color().unwrap(), Some(0xFFBBDEFB));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let settings = settings();
        settings.set_grade_class(gc(3, 7)).unwrap();
        settings.complete_initial_setup().unwrap();
        settings.store().put_bool(keys::NOTIFICATIONS_ENABLED, false).unwrap();

        settings.reset().unwrap();

        assert!(settings.store().keys().unwrap().is_empty());
        assert_eq!(settings.grade_class().unwrap(), gc(1, 1));
        assert!(settings.notifications_enabled().unwrap());
        assert!(!settings.initial_setup_completed().unwrap());
    }

    #[tokio::test]
    async fn test_change_class_moves_topic() {
        let settings = settings();
        let broker = Arc::new(RecordingBroker::default());
        let topics = TopicManager::new(broker.clone());
        settings.set_grade_class(gc(1, 1)).unwrap();

        let task = settings.change_class(gc(2, 3), &topics).unwrap().unwrap();
        task.wait().await;

        assert_eq!(settings.grade_class().unwrap(), gc(2, 3));
        let calls = broker.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&(TopicAction::Unsubscribe, "1-1".to_string())));
        assert!(calls.contains(&(TopicAction::Subscribe, "2-3".to_string())));
    }

    #[tokio::test]
    async fn test_change_class_with_notifications_off() {
        let settings = settings();
        let broker = Arc::new(RecordingBroker::default());
        let topics = TopicManager::new(broker.clone());
        settings.store().put_bool(keys::NOTIFICATIONS_ENABLED, false).unwrap();

        assert!(settings.change_class(gc(2, 3), &topics).unwrap().is_none());
        assert_eq!(settings.grade_class().unwrap(), gc(2, 3));
        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_notification_toggle() {
        let settings = settings();
        let broker = Arc::new(RecordingBroker::default());
        let topics = TopicManager::new(broker.clone());
        settings.set_grade_class(gc(2, 3)).unwrap();

        settings
            .set_notifications_enabled(false, &topics)
            .unwrap()
            .wait()
            .await;

        assert!(!settings.notifications_enabled().unwrap());
        assert_eq!(
            broker.calls(),
            vec![(TopicAction::Unsubscribe, "2-3".to_string())]
        );
    }
}
