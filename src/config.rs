//! Engine configuration
//!
//! Options record for the logging engine, with TOML load/save helpers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration combinations
///
/// The engine auto-corrects these instead of failing; the error type is how
/// the correction is reported internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// File output requested without a file path
    #[error("file output enabled but no file path set")]
    FileOutputWithoutPath,
}

/// Options record for the logging engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Write flushed content to the console stream (default: on)
    #[serde(default = "default_console_output")]
    pub console_output: bool,

    /// Write flushed content to the log file (default: off)
    #[serde(default)]
    pub file_output: bool,

    /// Path of the append-only log file
    #[serde(default)]
    pub file_path: PathBuf,

    /// Flush automatically once enough messages accumulate (default: off)
    #[serde(default)]
    pub auto_flush: bool,

    /// Message count that triggers an automatic flush (default: 1024)
    #[serde(default = "default_auto_flush_threshold")]
    pub auto_flush_threshold: usize,

    /// Suppress repeats of messages already buffered in the current loop
    /// window (default: off)
    #[serde(default)]
    pub dedup_enabled: bool,

    /// Distinct messages tracked before the dedup window clears itself
    /// (default: 1024)
    #[serde(default = "default_dedup_limit")]
    pub dedup_limit: usize,

    /// Flush remaining content when the process exits (default: off)
    #[serde(default)]
    pub flush_on_exit: bool,
}

fn default_console_output() -> bool {
    true
}

fn default_auto_flush_threshold() -> usize {
    1024
}

fn default_dedup_limit() -> usize {
    1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            console_output: default_console_output(),
            file_output: false,
            file_path: PathBuf::new(),
            auto_flush: false,
            auto_flush_threshold: default_auto_flush_threshold(),
            dedup_enabled: false,
            dedup_limit: default_dedup_limit(),
            flush_on_exit: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file, or return defaults if the file
    /// does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Check for combinations the engine will auto-correct
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_output && self.file_path.as_os_str().is_empty() {
            return Err(ConfigError::FileOutputWithoutPath);
        }
        Ok(())
    }
}

/// Default log file location (~/.bufflog/bufflog.log)
///
/// Falls back to a relative path if the home directory cannot be determined.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".bufflog"))
        .unwrap_or_else(|| PathBuf::from(".bufflog"))
        .join("bufflog.log")
}
