//! Configuration for the Lingo review system.
//!
//! Maps directly to `lingo.toml`. Every field has a default, so an empty
//! file (or no file at all) yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulingPolicy;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LingoConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Scheduling policy and session sizing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl LingoConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `LingoError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::LingoError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level or filter directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Scheduling policy and review-session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Which policy reviews run through: "binary" or "graded".
    #[serde(default)]
    pub policy: SchedulingPolicy,
    /// Default maximum number of items in a review session.
    #[serde(default = "default_session_limit")]
    pub session_limit: usize,
    /// Days covered by the workload forecast (at most 365).
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: SchedulingPolicy::Binary,
            session_limit: 20,
            forecast_days: 7,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Use WAL mode for concurrent reads.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Number of rotating backups to keep.
    #[serde(default = "default_3")]
    pub backup_count: u32,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            wal_mode: true,
            backup_count: 3,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_db_path() -> PathBuf { PathBuf::from("lingo.db") }
fn default_3() -> u32 { 3 }
fn default_forecast_days() -> u32 { 7 }
fn default_session_limit() -> usize { 20 }
