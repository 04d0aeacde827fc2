use crate::domain::errors::ProcessControlError;
use crate::domain::models::PriorityClass;

/// Port for OS-level controls applied to a running worker
///
/// Implementations act on a process id after spawn. Every call is
/// best-effort: the supervisor logs failures and keeps the worker running.
pub trait ProcessControl: Send + Sync {
    /// Apply a scheduling class to the process
    fn set_priority(&self, pid: u32, priority: PriorityClass) -> Result<(), ProcessControlError>;

    /// Restrict the process to the CPUs set in `mask` (bit 0 = first CPU)
    fn set_affinity(&self, pid: u32, mask: u64) -> Result<(), ProcessControlError>;

    /// Ask the process to close, leaving it time to exit on its own
    fn request_close(&self, pid: u32) -> Result<(), ProcessControlError>;
}
