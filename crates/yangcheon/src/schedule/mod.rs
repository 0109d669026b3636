/// Timetable fetching and display resolution
mod client;
mod error;
mod resolve;
mod types;

pub use client::{ScheduleClient, ScheduleClientConfig};
pub use error::ScheduleError;
pub use resolve::{resolve_display, split_override, DisplayCell, SubjectOverrideMap, NO_SELECTION};
pub use types::*;

#[cfg(test)]
pub(crate) use client::tests as test_backend;
