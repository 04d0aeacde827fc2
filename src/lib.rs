//! Herdsman - miner process supervisor
//!
//! Herdsman launches a configured set of mining worker processes, captures
//! their output into size-capped log files, relays status lines over a
//! loopback UDP broadcast, restarts workers that crash and shuts everything
//! down within a bounded window.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Configuration and runtime models, errors, ports
//! - **Service Layer** (`services`): Pure launch resolution and observer registries
//! - **Application Layer** (`application`): Supervisor and crash recovery
//! - **Infrastructure Layer** (`infrastructure`): Config loading, logging, UDP broadcast, OS process controls
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use herdsman::{ConfigLoader, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(".")?;
//!     let supervisor = Supervisor::new();
//!     let report = supervisor.start(Arc::new(config)).await?;
//!     println!("started {:?}", report.started);
//!     tokio::signal::ctrl_c().await?;
//!     supervisor.stop().await;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{RecoveryAction, RecoveryTracker, ShutdownTimings, Supervisor};
pub use domain::models::{
    ConnectionState, GlobalConfig, OptionTemplate, OutputEvent, OutputStream, Pool,
    PriorityClass, StartReport, StatusMessage, StopReport, SupervisorState, WorkerSpec,
};
pub use domain::ports::ProcessControl;
pub use domain::{LaunchError, ProcessControlError, SupervisorError};
pub use infrastructure::broadcast::{BroadcastClient, BroadcastServer};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ObserverId, ObserverRegistry};
