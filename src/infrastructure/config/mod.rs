//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Validation of names, references and executable paths

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_FILE_NAME};
