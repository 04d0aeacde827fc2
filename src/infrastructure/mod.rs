//! Infrastructure layer module
//!
//! This module contains the adapters that touch the operating system:
//! - Configuration loading (figment, YAML + environment)
//! - Logging infrastructure (tracing setup, per-worker log files)
//! - Loopback UDP status broadcast
//! - Process controls (priority, affinity, signals, run-as identity)
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod broadcast;
pub mod config;
pub mod logging;
pub mod process;
