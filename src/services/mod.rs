pub mod launch;
pub mod observers;

pub use launch::{
    build_command_line, resolve_cpu_affinity, resolve_host_port, resolve_priority,
    sanitize_line, split_command_line, CommandLineParams,
};
pub use observers::{ObserverId, ObserverRegistry};
