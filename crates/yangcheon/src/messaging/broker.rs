//! Push-messaging backends.

use super::error::MessagingError;
use futures::future::BoxFuture;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default Instance ID service root.
pub const IID_ENDPOINT: &str = "https://iid.googleapis.com/iid";

/// Something that can attach this install to a topic or detach it.
pub trait TopicBroker: Send + Sync {
    fn subscribe<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, Result<(), MessagingError>>;

    fn unsubscribe<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, Result<(), MessagingError>>;
}

/// Configuration for [`IidTopicBroker`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Instance ID service root; defaults to [`IID_ENDPOINT`]
    pub endpoint: Option<String>,
    /// Value sent as `Authorization: key=...`
    pub auth_key: Option<String>,
    /// Registration token of this install
    pub registration_token: Option<String>,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    to: String,
    registration_tokens: [&'a str; 1],
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchResult>,
}

#[derive(Deserialize)]
struct BatchResult {
    #[serde(default)]
    error: Option<String>,
}

/// Topic broker backed by the Instance ID batch endpoints.
pub struct IidTopicBroker {
    client: Client,
    batch_add: Url,
    batch_remove: Url,
    auth_key: String,
    registration_token: String,
}

impl IidTopicBroker {
    /// Builds a broker, failing if the install has no credentials.
    pub fn new(config: &MessagingConfig) -> Result<Self, MessagingError> {
        let (Some(auth_key), Some(registration_token)) =
            (config.auth_key.clone(), config.registration_token.clone())
        else {
            return Err(MessagingError::NotConfigured {
                message: "auth_key and registration_token are required".to_string(),
            });
        };

        let root = config
            .endpoint
            .as_deref()
            .unwrap_or(IID_ENDPOINT)
            .trim_end_matches('/');

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MessagingError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            batch_add: Url::parse(&format!("{root}/v1:batchAdd"))?,
            batch_remove: Url::parse(&format!("{root}/v1:batchRemove"))?,
            auth_key,
            registration_token,
        })
    }

    async fn batch(&self, url: &Url, topic: &str) -> Result<(), MessagingError> {
        let body = BatchRequest {
            to: format!("/topics/{topic}"),
            registration_tokens: [self.registration_token.as_str()],
        };

        debug!(url = %url, topic = %topic, "Sending topic batch request");

        let response = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, format!("key={}", self.auth_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MessagingError::Rejected {
                topic: topic.to_string(),
                reason: format!("status {}: {}", status, text),
            });
        }

        let parsed: BatchResponse = response.json().await?;
        match parsed.results.into_iter().find_map(|r| r.error) {
            Some(reason) => Err(MessagingError::Rejected {
                topic: topic.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl TopicBroker for IidTopicBroker {
    fn subscribe<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, Result<(), MessagingError>> {
        Box::pin(self.batch(&self.batch_add, topic))
    }

    fn unsubscribe<'a>(&'a self, topic: &'a str) -> BoxFuture<'a, Result<(), MessagingError>> {
        Box::pin(self.batch(&self.batch_remove, topic))
    }
}

/// Broker for installs without messaging credentials; every request fails
/// with [`MessagingError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredBroker;

impl TopicBroker for UnconfiguredBroker {
    fn subscribe<'a>(&'a self, _topic: &'a str) -> BoxFuture<'a, Result<(), MessagingError>> {
        Box::pin(async { Err(not_configured()) })
    }

    fn unsubscribe<'a>(&'a self, _topic: &'a str) -> BoxFuture<'a, Result<(), MessagingError>> {
        Box::pin(async { Err(not_configured()) })
    }
}

fn not_configured() -> MessagingError {
    MessagingError::NotConfigured {
        message: "no messaging credentials".to_string(),
    }
}
