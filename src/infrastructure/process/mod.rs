//! OS process controls: scheduling priority, CPU affinity, close requests
//! and run-as identity.

pub mod control;
pub mod identity;

pub use control::UnixProcessControl;
pub use identity::{apply_identity, resolve_identity, RunAsIdentity};
