//! Configuration types for quake-report

use crate::error::{Error, Result};
use crate::feed::request::{DEFAULT_ENDPOINT, ORDER_BY_TIME};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Feed endpoint and HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base query endpoint (default: the USGS FDSN event query)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Connect timeout (default: 15 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Deadline for the whole request including reading the body (default: 10 seconds)
    #[serde(default = "default_read_timeout", with = "duration_serde")]
    pub read_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Values used when the preference store has no setting
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreferenceDefaults {
    /// Minimum magnitude filter (default: "1")
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: String,

    /// Sort order key (default: "time")
    #[serde(default = "default_order_by")]
    pub order_by: String,
}

impl Default for PreferenceDefaults {
    fn default() -> Self {
        Self {
            min_magnitude: default_min_magnitude(),
            order_by: default_order_by(),
        }
    }
}

/// What happens to the visible list when a load yields no usable data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep showing the last successfully loaded list
    #[default]
    PreserveList,
    /// Clear the list and show only the failure reason
    ClearList,
}

/// Main configuration for the load pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Feed endpoint and HTTP client settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Fallbacks for unset preferences
    #[serde(default)]
    pub preferences: PreferenceDefaults,

    /// Visible-list behavior on failed loads
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Capacity of the lifecycle event broadcast channel (default: 64)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            preferences: PreferenceDefaults::default(),
            failure_policy: FailurePolicy::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.feed.endpoint).map_err(|e| {
            Error::config(
                "feed.endpoint",
                format!("'{}' is not an absolute URL: {}", self.feed.endpoint, e),
            )
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::config(
                "feed.endpoint",
                format!("'{}' cannot carry query parameters", self.feed.endpoint),
            ));
        }
        if self.feed.connect_timeout.is_zero() {
            return Err(Error::config(
                "feed.connect_timeout",
                "connect timeout must be greater than zero",
            ));
        }
        if self.feed.read_timeout.is_zero() {
            return Err(Error::config(
                "feed.read_timeout",
                "read timeout must be greater than zero",
            ));
        }
        if self.event_buffer == 0 {
            return Err(Error::config(
                "event_buffer",
                "event buffer must hold at least one event",
            ));
        }
        Ok(())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("quake-report/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_min_magnitude() -> String {
    "1".to_string()
}

fn default_order_by() -> String {
    ORDER_BY_TIME.to_string()
}

fn default_event_buffer() -> usize {
    64
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
