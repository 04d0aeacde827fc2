//! Port traits implemented by the infrastructure layer.

pub mod process_control;

pub use process_control::ProcessControl;
