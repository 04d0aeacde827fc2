//! Per-worker log files.
//!
//! Each enabled worker gets one append-mode file. Before a line is written
//! the file size is checked, and a file grown past its limit is truncated to
//! empty. Lines are prefixed with a local-time stamp such as
//! `10/18/2026 03:04:05 PM: `.

use chrono::Local;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Timestamp prefix written in front of every line
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p: ";

struct WorkerLogStream {
    path: PathBuf,
    max_bytes: u64,
    file: Mutex<File>,
}

/// Set of open worker log files keyed by worker name
#[derive(Default)]
pub struct WorkerLogSink {
    streams: RwLock<HashMap<String, Arc<WorkerLogStream>>>,
}

impl WorkerLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or create) the log file for `worker`, appending to existing content
    ///
    /// Re-opening a worker replaces its previous stream.
    pub async fn open(&self, worker: &str, path: &Path, max_bytes: u64) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        let stream = Arc::new(WorkerLogStream {
            path: path.to_path_buf(),
            max_bytes,
            file: Mutex::new(file),
        });

        debug!(worker, path = %path.display(), max_bytes, "opened worker log");
        self.streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(worker.to_string(), stream);
        Ok(())
    }

    /// Append a timestamped line to the worker's log
    ///
    /// Returns `Ok(false)` when the worker has no open log, in which case the
    /// line is dropped.
    pub async fn write(&self, worker: &str, message: &str) -> io::Result<bool> {
        let Some(stream) = self.stream(worker) else {
            return Ok(false);
        };

        let mut file = stream.file.lock().await;
        let size = file.metadata().await?.len();
        if size > stream.max_bytes {
            debug!(worker, size, max_bytes = stream.max_bytes, "truncating worker log");
            file.set_len(0).await?;
        }

        let line = format!("{}{message}\n", Local::now().format(TIMESTAMP_FORMAT));
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(true)
    }

    /// Stop logging for `worker`; later writes for it are dropped
    pub async fn disable(&self, worker: &str) -> bool {
        let removed = self
            .streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(worker);

        match removed {
            Some(stream) => {
                close_stream(worker, &stream).await;
                true
            }
            None => false,
        }
    }

    /// Flush and close every open log
    pub async fn close_all(&self) {
        let streams: Vec<(String, Arc<WorkerLogStream>)> = self
            .streams
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();

        for (worker, stream) in streams {
            close_stream(&worker, &stream).await;
        }
    }

    pub fn is_open(&self, worker: &str) -> bool {
        self.stream(worker).is_some()
    }

    /// Path of the worker's open log file, if any
    pub fn log_path(&self, worker: &str) -> Option<PathBuf> {
        self.stream(worker).map(|stream| stream.path.clone())
    }

    fn stream(&self, worker: &str) -> Option<Arc<WorkerLogStream>> {
        self.streams
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(worker)
            .cloned()
    }
}

async fn close_stream(worker: &str, stream: &WorkerLogStream) {
    let mut file = stream.file.lock().await;
    if let Err(e) = file.flush().await {
        warn!(worker, error = %e, "failed to flush worker log");
    }
}
