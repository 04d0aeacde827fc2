//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

use herdsman::application::ShutdownTimings;
use herdsman::domain::models::{GlobalConfig, OptionTemplate, WorkerSpec};

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Write an executable shell script into `dir`
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    let mut permissions = std::fs::metadata(&path)
        .expect("Failed to stat script")
        .permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).expect("Failed to chmod script");
    path
}

/// Option template running a script with no arguments
pub fn script_option(name: &str, executable: PathBuf) -> OptionTemplate {
    OptionTemplate {
        name: name.to_string(),
        executable,
        argument_format: String::new(),
        arguments: String::new(),
    }
}

/// Configuration with one worker per `(worker, option)` pair, logging into `dir`
pub fn config_with(
    dir: &Path,
    options: Vec<OptionTemplate>,
    workers: &[(&str, &str)],
) -> GlobalConfig {
    GlobalConfig {
        default_option: options.first().map(|o| o.name.clone()).unwrap_or_default(),
        base_path: dir.to_path_buf(),
        options,
        workers: workers
            .iter()
            .map(|(name, option)| WorkerSpec::new(*name, *option))
            .collect(),
        ..Default::default()
    }
}

/// Short timings so shutdown and recovery tests finish quickly
pub fn fast_timings() -> ShutdownTimings {
    ShutdownTimings {
        poll_interval: Duration::from_millis(200),
        poll_attempts: 4,
        monitor_interval: Duration::from_millis(100),
    }
}

/// Wait for a condition to be true with timeout
///
/// Polls the predicate every 50ms until it returns true or timeout is reached.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    false
}
