use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::domain::errors::ProcessControlError;
use crate::domain::models::PriorityClass;
use crate::domain::ports::ProcessControl;

/// Process controls backed by Unix system calls
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixProcessControl;

impl UnixProcessControl {
    pub const fn new() -> Self {
        Self
    }
}

fn to_pid(pid: u32) -> Result<Pid, String> {
    i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| format!("pid {pid} out of range"))
}

impl ProcessControl for UnixProcessControl {
    fn set_priority(&self, pid: u32, priority: PriorityClass) -> Result<(), ProcessControlError> {
        let nice = priority.nice_value();

        // SAFETY: setpriority only reads its integer arguments; an invalid
        // pid is reported through errno.
        #[allow(unsafe_code)]
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, pid as libc::id_t, nice) };

        if rc == -1 {
            return Err(ProcessControlError::Priority {
                pid,
                reason: std::io::Error::last_os_error().to_string(),
            });
        }

        debug!(pid, %priority, nice, "priority applied");
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn set_affinity(&self, pid: u32, mask: u64) -> Result<(), ProcessControlError> {
        use nix::sched::{sched_setaffinity, CpuSet};

        let affinity_error = |reason: String| ProcessControlError::Affinity { pid, reason };
        let target = to_pid(pid).map_err(affinity_error)?;

        let mut cpus = CpuSet::new();
        for cpu in (0..64usize).filter(|bit| mask & (1u64 << *bit) != 0) {
            cpus.set(cpu).map_err(|e| affinity_error(e.to_string()))?;
        }

        sched_setaffinity(target, &cpus).map_err(|e| affinity_error(e.to_string()))?;
        debug!(pid, mask = format_args!("{mask:#x}"), "affinity applied");
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn set_affinity(&self, _pid: u32, _mask: u64) -> Result<(), ProcessControlError> {
        Err(ProcessControlError::Unsupported("CPU affinity"))
    }

    fn request_close(&self, pid: u32) -> Result<(), ProcessControlError> {
        let signal_error = |reason: String| ProcessControlError::Signal { pid, reason };
        let target = to_pid(pid).map_err(signal_error)?;

        kill(target, Signal::SIGTERM).map_err(|e| signal_error(e.to_string()))
    }
}
