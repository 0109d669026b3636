//! Error types for push-topic management.

use thiserror::Error;

/// Errors that can occur while (un)subscribing a topic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The messaging service refused the request
    #[error("Topic {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },

    /// Broker is not configured for this install
    #[error("Messaging is not configured: {message}")]
    NotConfigured { message: String },

    /// The spawned request task panicked or was cancelled
    #[error("Topic task failed: {message}")]
    Task { message: String },
}

impl From<reqwest::Error> for MessagingError {
    fn from(err: reqwest::Error) -> Self {
        MessagingError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for MessagingError {
    fn from(err: url::ParseError) -> Self {
        MessagingError::NotConfigured {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for MessagingError {
    fn from(err: tokio::task::JoinError) -> Self {
        MessagingError::Task {
            message: err.to_string(),
        }
    }
}
