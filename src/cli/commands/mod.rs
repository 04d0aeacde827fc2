//! CLI command implementations.

pub mod init;
pub mod listen;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::models::GlobalConfig;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from a file, a directory holding `herdsman.yaml`, or
/// the current directory
pub(crate) fn load_config(path: Option<&Path>) -> Result<GlobalConfig> {
    let config = match path {
        Some(path) if path.is_dir() => ConfigLoader::load(path),
        Some(path) => ConfigLoader::load_from_file(path),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            ConfigLoader::load(cwd)
        }
    };
    config.context("Failed to load configuration")
}
