//! Operator settings read from `ziman.toml`.

use crate::constants;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    /// systemd unit name (without `.service` is fine).
    #[serde(default = "default_service_name")]
    pub name: String,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Seconds to wait after a restart before verifying it.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    #[serde(default = "default_log_lines")]
    pub log_lines: usize,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_path: default_log_path(),
            settle_secs: default_settle_secs(),
            log_lines: default_log_lines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    /// Shorter manual passwords need an explicit override.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    #[serde(default = "default_generated_length")]
    pub default_generated_length: usize,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            default_generated_length: default_generated_length(),
        }
    }
}

impl PolicySection {
    pub fn is_weak(&self, candidate: &str) -> bool {
        candidate.chars().count() < self.min_password_length
    }
}

fn default_service_name() -> String {
    constants::DEFAULT_SERVICE_NAME.to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from(constants::DEFAULT_LOG_PATH)
}

fn default_settle_secs() -> u64 {
    constants::DEFAULT_SETTLE_SECS
}

fn default_log_lines() -> usize {
    constants::DEFAULT_LOG_LINES
}

fn default_min_password_length() -> usize {
    constants::DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_generated_length() -> usize {
    constants::DEFAULT_GENERATED_LENGTH
}
