use std::time::Duration;

use crate::error::ClientError;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                       |
    /// |--------------------------|-------------------------------|
    /// | `TASKBOARD_API_URL`      | `http://localhost:3000/api`   |
    /// | `TASKBOARD_TIMEOUT_SECS` | `30`                          |
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let api_url = get("TASKBOARD_API_URL").unwrap_or(defaults.api_url);

        let timeout_secs = match get("TASKBOARD_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("TASKBOARD_TIMEOUT_SECS must be a number, got '{raw}'"))
            })?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            api_url,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
