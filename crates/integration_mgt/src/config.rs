//! MGT client configuration

use serde::{Deserialize, Serialize};

/// Production endpoint of the moscowapp API
pub const DEFAULT_BASE_URL: &str = "https://api.moscowapp.mos.ru/v8.2/";

/// How the stop identifier is placed into the `stop_v2/{id}` path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopIdEncoding {
    /// Insert the identifier as given; callers may pass pre-encoded values
    #[default]
    Verbatim,
    /// Percent-encode the identifier as a single path segment
    Percent,
}

/// Configuration for the stop forecast client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MgtConfig {
    /// Base URL of the API, terminated by a slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Value of the `User-Agent` header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Stop identifier encoding in request paths
    #[serde(default)]
    pub stop_id_encoding: StopIdEncoding,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

impl Default for MgtConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            stop_id_encoding: StopIdEncoding::default(),
        }
    }
}

impl MgtConfig {
    /// Create a configuration suitable for testing against a local mock server
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 2,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        Ok(())
    }
}
