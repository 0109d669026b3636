//! Error types for schedule fetching.

use thiserror::Error;

/// Errors that can occur while talking to the schedule backend.
#[derive(Debug, Error, Clone)]
pub enum ScheduleError {
    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Server answered with a non-success status
    #[error("Schedule server returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    Url { message: String },
}

impl From<reqwest::Error> for ScheduleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScheduleError::Decode {
                message: err.to_string(),
            }
        } else {
            ScheduleError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::Decode {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ScheduleError {
    fn from(err: url::ParseError) -> Self {
        ScheduleError::Url {
            message: err.to_string(),
        }
    }
}
