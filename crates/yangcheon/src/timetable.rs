//! Weekly timetable state shared by both apps.
//!
//! One component covers both identity kinds: the student app refreshes with a
//! [`IdentityKey::GradeClass`], the teacher app with a
//! [`IdentityKey::TeacherId`]. A failed refresh leaves the last good grid in
//! place.

use crate::period::{is_current_period, Clock, PERIOD_COUNT, WEEKDAY_COUNT};
use crate::schedule::{
    resolve_display, AppVariant, DisplayCell, IdentityKey, ScheduleClient, ScheduleGrid,
    SubjectOverrideMap,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// One slot of the rendered grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCell {
    /// 1 = Monday .. 5 = Friday
    pub column: u8,
    pub period: u8,
    pub display: Option<DisplayCell>,
    pub is_current: bool,
}

pub struct Timetable {
    client: ScheduleClient,
    grid: RwLock<ScheduleGrid>,
    clock: Arc<dyn Clock>,
}

impl Timetable {
    pub fn new(client: ScheduleClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            grid: RwLock::new(ScheduleGrid::empty()),
            clock,
        }
    }

    /// Fetches the timetable for `key` and replaces the grid on success.
    ///
    /// Returns whether the grid was updated.
    pub async fn refresh(&self, key: &IdentityKey) -> bool {
        match self.client.fetch_schedule(key).await {
            Ok(grid) => {
                info!(key = %key, lessons = grid.len(), "Timetable refreshed");
                *self.grid.write().await = grid;
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Timetable refresh failed, keeping previous grid");
                false
            }
        }
    }

    /// Snapshot of the current grid.
    pub async fn grid(&self) -> ScheduleGrid {
        self.grid.read().await.clone()
    }

    /// Renders 7 period rows of 5 day columns at the clock's current time.
    pub async fn rows(
        &self,
        overrides: &SubjectOverrideMap,
        variant: AppVariant,
    ) -> Vec<Vec<RenderedCell>> {
        let grid = self.grid.read().await;
        render(&grid, overrides, variant, self.clock.as_ref())
    }
}

/// Renders `grid` period-major, resolving placeholders and marking the slot
/// that is running now.
pub fn render(
    grid: &ScheduleGrid,
    overrides: &SubjectOverrideMap,
    variant: AppVariant,
    clock: &dyn Clock,
) -> Vec<Vec<RenderedCell>> {
    let now = clock.now();

    (1..=PERIOD_COUNT)
        .map(|period| {
            (1..=WEEKDAY_COUNT)
                .map(|column| RenderedCell {
                    column,
                    period,
                    display: grid
                        .get(column, period)
                        .map(|entry| resolve_display(entry, overrides, variant)),
                    is_current: is_current_period(period, column, now),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::FixedClock;
    use crate::schedule::test_backend::{class_router, spawn_backend};
    use crate::schedule::{GradeClass, ScheduleClientConfig};
    use chrono::NaiveDate;

    fn monday_at(hour: u32, minute: u32) -> Arc<dyn Clock> {
        // 2024-03-04 is a Monday.
        let now = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        Arc::new(FixedClock(now))
    }

    async fn timetable(clock: Arc<dyn Clock>) -> Timetable {
        let base_url = spawn_backend(class_router()).await;
        let client = ScheduleClient::new(&ScheduleClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();
        Timetable::new(client, clock)
    }

    fn class(grade: u8, class: u8) -> IdentityKey {
        IdentityKey::GradeClass(GradeClass::new(grade, class).unwrap())
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_grid() {
        let timetable = timetable(monday_at(8, 0)).await;

        assert!(timetable.refresh(&class(2, 3)).await);
        let before = timetable.grid().await;
        assert_eq!(before.len(), 3);

        assert!(!timetable.refresh(&class(1, 1)).await);
        assert_eq!(timetable.grid().await, before);
    }

    #[tokio::test]
    async fn test_failed_first_refresh_stays_empty() {
        let timetable = timetable(monday_at(8, 0)).await;
        assert!(!timetable.refresh(&class(3, 11)).await);
        assert!(timetable.grid().await.is_empty());
    }

    #[tokio::test]
    async fn test_rows_resolve_and_mark_current() {
        let timetable = timetable(monday_at(8, 30)).await;
        timetable.refresh(&class(2, 3)).await;

        let overrides: SubjectOverrideMap = [("탐구B", "화학I/203")].into_iter().collect();
        let rows = timetable.rows(&overrides, AppVariant::Student).await;

        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|row| row.len() == 5));

        let first = &rows[0][0];
        assert!(first.is_current);
        let display = first.display.as_ref().unwrap();
        assert_eq!(display.subject, "화학I");
        assert_eq!(display.secondary, "203");

        assert_eq!(rows[1][0].display.as_ref().unwrap().secondary, "김선생");
        assert!(!rows[1][0].is_current);
        assert_eq!(rows[0][1].display.as_ref().unwrap().subject, "물리I");
        assert!(!rows[0][1].is_current);
        assert!(rows[6][4].display.is_none());

        let current: Vec<_> = rows.iter().flatten().filter(|c| c.is_current).collect();
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn test_render_empty_grid_during_break() {
        let rows = render(
            &ScheduleGrid::empty(),
            &SubjectOverrideMap::new(),
            AppVariant::Teacher,
            monday_at(12, 30).as_ref(),
        );
        assert!(rows.iter().flatten().all(|c| c.display.is_none() && !c.is_current));
    }
}
