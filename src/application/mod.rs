pub mod recovery;
pub mod supervisor;

pub use recovery::{RecoveryAction, RecoveryTracker};
pub use supervisor::{ShutdownTimings, Supervisor, MAX_LINE_BYTES, WORKER_NAME_ENV};
