use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::models::GlobalConfig;

/// File name of the supervisor's own trace log
pub const TRACE_LOG_FILE_NAME: &str = "herdsman_trace.log";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for the trace log file (optional, if None logs only to stderr)
    pub log_dir: Option<PathBuf>,

    /// Enable stderr logging
    #[serde(default = "default_true")]
    pub enable_stderr: bool,

    /// Log rotation policy for the trace log file
    #[serde(default)]
    pub rotation: RotationPolicy,

    /// Number of rotated trace log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            enable_stderr: true,
            rotation: RotationPolicy::default(),
            max_log_files: default_max_log_files(),
        }
    }
}

impl LogConfig {
    /// Derive the supervisor's logging setup from a loaded configuration
    ///
    /// The trace log file is only written when debug logging is on, and it
    /// lives next to the worker logs.
    pub fn from_global(config: &GlobalConfig) -> Self {
        let format = if config.logging.format == "json" {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        Self {
            level: config.logging.level.clone(),
            format,
            log_dir: config.debug_logging.then(|| config.base_path.clone()),
            ..Self::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}

const fn default_true() -> bool {
    true
}

const fn default_max_log_files() -> usize {
    7
}
