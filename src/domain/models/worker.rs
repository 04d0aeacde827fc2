//! Runtime models shared by the supervisor, its observers and the status
//! broadcast.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse supervisor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorState {
    #[default]
    Stopped,
    Started,
}

/// Broadcast client lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Which standard stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Raw line produced by a worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub worker: String,
    pub stream: OutputStream,
    pub line: String,
}

/// Status line received over the broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub worker: String,
    pub text: String,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.worker, self.text)
    }
}

/// Outcome of launching the configured workers
#[derive(Debug, Default, Serialize)]
pub struct StartReport {
    /// Workers launched, in launch order
    pub started: Vec<String>,

    /// Workers that failed to launch with the reason
    pub failed: Vec<(String, String)>,

    /// Disabled workers that were not launched
    pub skipped: Vec<String>,
}

impl StartReport {
    pub fn all_started(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of shutting workers down
#[derive(Debug, Default, Serialize)]
pub struct StopReport {
    /// Workers that exited within the graceful window
    pub exited: Vec<String>,

    /// Workers that had to be killed
    pub killed: Vec<String>,
}
