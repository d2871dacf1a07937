//! Monitor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::MonitorError;

/// Configuration for the cluster monitor.
///
/// Can be loaded from a TOML file via [`MonitorConfig::from_toml_file`]
/// or built programmatically (e.g. for tests). Every field is optional
/// in the file; missing fields take the defaults below.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Period of the discovery cycle, in milliseconds.
    #[serde(default = "default_fetch_interval_ms")]
    pub fetch_interval_ms: u64,

    /// Period of the retry cycle, in milliseconds.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Period of the liveness-revalidation cycle, in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Location of the persisted cache snapshot.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Seed peer addresses ("host:port") handed to the transport.
    #[serde(default)]
    pub seed_peers: Vec<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_fetch_interval_ms() -> u64 {
    5_000
}

fn default_reconnect_interval_ms() -> u64 {
    5_000
}

fn default_refresh_interval_ms() -> u64 {
    60_000
}

fn default_output() -> PathBuf {
    PathBuf::from("cache.bin")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MonitorError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, MonitorError> {
        toml::from_str(s).map_err(|e| MonitorError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("MonitorConfig is always serializable to TOML")
    }

    /// Reject configurations that would busy-loop a timer.
    pub fn validate(&self) -> Result<(), MonitorError> {
        let intervals = [
            ("fetch_interval_ms", self.fetch_interval_ms),
            ("reconnect_interval_ms", self.reconnect_interval_ms),
            ("refresh_interval_ms", self.refresh_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(MonitorError::Config(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_millis(self.fetch_interval_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            fetch_interval_ms: default_fetch_interval_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
            output: default_output(),
            seed_peers: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
