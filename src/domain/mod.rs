//! Domain layer for the herdsman supervisor
//!
//! Configuration model, runtime models, errors and port traits. Nothing in
//! here touches the OS or the network.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{LaunchError, ProcessControlError, SupervisorError};
