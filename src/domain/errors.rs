//! Domain errors for the herdsman supervisor.

use thiserror::Error;

use super::models::OutputStream;

/// Errors raised by supervisor lifecycle operations
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Supervisor is already started")]
    AlreadyStarted,

    #[error("Failed to start status broadcast: {0}")]
    Broadcast(String),
}

/// Errors raised while launching a single worker
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Worker '{worker}' references unknown option '{option}'")]
    UnknownOption { worker: String, option: String },

    #[error("Worker '{0}' resolved to an empty command line")]
    EmptyCommandLine(String),

    #[error("Unknown run-as user '{user}' for worker '{worker}'")]
    UnknownUser { worker: String, user: String },

    #[error("Failed to look up run-as user '{user}': {reason}")]
    UserLookup { user: String, reason: String },

    #[error("Failed to spawn worker '{worker}': {source}")]
    Spawn {
        worker: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture {stream} of worker '{worker}'")]
    MissingPipe { worker: String, stream: OutputStream },
}

/// Errors raised by OS-level process controls
#[derive(Debug, Error)]
pub enum ProcessControlError {
    #[error("Failed to set priority of pid {pid}: {reason}")]
    Priority { pid: u32, reason: String },

    #[error("Failed to set CPU affinity of pid {pid}: {reason}")]
    Affinity { pid: u32, reason: String },

    #[error("Failed to signal pid {pid}: {reason}")]
    Signal { pid: u32, reason: String },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

pub type LaunchResult<T> = Result<T, LaunchError>;
