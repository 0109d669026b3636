/// Runtime configuration loaded from a JSON file
use crate::messaging::MessagingConfig;
use crate::schedule::{AppVariant, ScheduleClientConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable overriding `schedule_base_url`.
pub const SCHEDULE_URL_ENV: &str = "YANGCHEON_SCHEDULE_URL";

/// Page embedded by the lunch screen.
pub const DEFAULT_LUNCH_URL: &str = "https://meal.helgisnw.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level configuration. Every field has a default, so `{}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub variant: AppVariant,
    pub schedule_base_url: String,
    pub lunch_url: String,
    pub preferences_path: PathBuf,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub messaging: MessagingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let schedule = ScheduleClientConfig::default();
        Self {
            variant: AppVariant::default(),
            schedule_base_url: schedule.base_url,
            lunch_url: DEFAULT_LUNCH_URL.to_string(),
            preferences_path: PathBuf::from("yangcheon_prefs.db"),
            user_agent: schedule.user_agent,
            connect_timeout_secs: schedule.connect_timeout.as_secs(),
            messaging: MessagingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config at `path`, then applies environment overrides.
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Loading config");
                Self::from_json(&content).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Applies overrides looked up through `lookup` (normally the process
    /// environment).
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(SCHEDULE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!(url = %url, "Schedule URL overridden from environment");
            self.schedule_base_url = url;
        }
        self
    }

    pub fn schedule_client_config(&self) -> ScheduleClientConfig {
        ScheduleClientConfig {
            base_url: self.schedule_base_url.clone(),
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}
