//! Shared logic for the Yangcheon Life student and teacher apps.
//!
//! The crate covers everything below the screens: fetching the weekly
//! timetable, deciding which period is running, substituting elective
//! placeholders with the user's choices, persisting settings, and keeping
//! the push-notification topic in line with the selected class.

pub mod config;
pub mod electives;
pub mod lunch;
pub mod messaging;
pub mod period;
pub mod prefs;
pub mod schedule;
pub mod timetable;
pub mod wifi;
