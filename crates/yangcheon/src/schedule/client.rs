//! HTTP client for the timetable backend.
//!
//! Endpoints:
//! - `GET /{grade}/{class}`: weekly timetable of a homeroom
//! - `GET /{teacherId}`: weekly timetable of a teacher
//! - `GET /teachers`: list of teachers to pick from
//!
//! Every call is a single round trip. Nothing is cached or retried.

use super::error::ScheduleError;
use super::types::{IdentityKey, ScheduleGrid, ScheduleItem, Teacher};
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Configuration for the schedule client.
#[derive(Debug, Clone)]
pub struct ScheduleClientConfig {
    /// Base URL of the schedule backend
    pub base_url: String,
    /// User agent string
    pub user_agent: String,
    /// Connection establishment timeout. Requests themselves have no
    /// deadline.
    pub connect_timeout: Duration,
}

impl Default for ScheduleClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            user_agent: concat!("yangcheon/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for fetching timetables and the teacher list.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    client: Client,
    base_url: Url,
}

impl ScheduleClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &ScheduleClientConfig) -> Result<Self, ScheduleError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ScheduleError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches the weekly timetable for a homeroom or a teacher.
    pub async fn fetch_schedule(&self, key: &IdentityKey) -> Result<ScheduleGrid, ScheduleError> {
        let url = match key {
            IdentityKey::GradeClass(gc) => {
                let grade = gc.grade().to_string();
                let class = gc.class().to_string();
                self.endpoint(&[grade.as_str(), class.as_str()])?
            }
            IdentityKey::TeacherId(id) => self.endpoint(&[id.as_str()])?,
        };

        let days: Vec<Vec<ScheduleItem>> = self.get_json(url).await?;
        let grid = ScheduleGrid::from_days(days);

        info!(key = %key, lessons = grid.len(), "Fetched timetable");
        Ok(grid)
    }

    /// Fetches the list of teachers.
    pub async fn fetch_teachers(&self) -> Result<Vec<Teacher>, ScheduleError> {
        let url = self.endpoint(&["teachers"])?;
        let teachers: Vec<Teacher> = self.get_json(url).await?;

        info!(count = teachers.len(), "Fetched teacher list");
        Ok(teachers)
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ScheduleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScheduleError::Url {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ScheduleError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();

        debug!(
            correlation_id = %correlation_id,
            url = %url,
            "Sending request"
        );

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                correlation_id = %correlation_id,
                url = %url,
                status = status.as_u16(),
                "Schedule server returned an error status"
            );
            return Err(ScheduleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str(&text)?;

        debug!(
            correlation_id = %correlation_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        Ok(parsed)
    }
}

/// Parses the base URL, making sure it ends with a slash so that segments
/// are appended rather than replacing the last one.
fn parse_base_url(raw: &str) -> Result<Url, ScheduleError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Generates a short correlation ID for request tracing.
fn generate_correlation_id() -> String {
    let random: u32 = rand::thread_rng().gen();
    format!("{:08x}", random)
}
