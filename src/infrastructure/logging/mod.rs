//! Logging infrastructure
//!
//! - Supervisor tracing setup (stderr plus an optional JSON trace file)
//! - Per-worker log files with size-capped truncation
//! - Credential scrubbing for logged command lines

pub mod config;
pub mod logger;
pub mod secret_scrubbing;
pub mod worker_log;

pub use config::{LogConfig, LogFormat, RotationPolicy, TRACE_LOG_FILE_NAME};
pub use logger::{parse_log_level, LoggerImpl};
pub use secret_scrubbing::SecretScrubber;
pub use worker_log::{WorkerLogSink, TIMESTAMP_FORMAT};
