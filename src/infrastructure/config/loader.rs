use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::domain::models::GlobalConfig;

/// File name looked up in the configuration directory
pub const CONFIG_FILE_NAME: &str = "herdsman.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The configuration file '{0}' was not found or is inaccessible")]
    FileNotFound(PathBuf),

    #[error("Failed to load configuration from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("The default option is not specified. Set 'default_option' to the name of an option")]
    EmptyDefaultOption,

    #[error("The default option '{0}' does not exist")]
    UnknownDefaultOption(String),

    #[error("The default pool '{0}' does not exist")]
    UnknownDefaultPool(String),

    #[error("Invalid name on {kind}. Every {kind} must have a non-empty name")]
    EmptyName { kind: &'static str },

    #[error("Duplicate {kind} name '{name}' detected. {kind} names must be unique")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Invalid option '{option}' on worker '{worker}'. The option must name an available option")]
    UnknownOption { worker: String, option: String },

    #[error("Invalid alternate option '{option}' on worker '{worker}'")]
    UnknownAlternateOption { worker: String, option: String },

    #[error("Invalid pool '{pool}' on worker '{worker}'")]
    UnknownPool { worker: String, pool: String },

    #[error("Invalid path for option '{option}'. The file '{path}' was not found or is inaccessible")]
    ExecutableNotFound { option: String, path: PathBuf },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to write configuration to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `herdsman.yaml` from a directory
    pub fn load(dir: impl AsRef<Path>) -> Result<GlobalConfig, ConfigError> {
        Self::load_from_file(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific file
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. The YAML file
    /// 3. Environment variables (`HERDSMAN_*` prefix, `__` for nesting)
    ///
    /// A relative `base_path` is taken relative to the file's directory, and
    /// relative executable paths are taken relative to `base_path`. Both end
    /// up absolute.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<GlobalConfig, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let mut config: GlobalConfig = Figment::new()
            .merge(Serialized::defaults(GlobalConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("HERDSMAN_").split("__"))
            .extract()
            .map_err(|e| ConfigError::Load {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        if config.base_path == Path::new(".") {
            config.base_path = dir.to_path_buf();
        } else if config.base_path.is_relative() {
            config.base_path = dir.join(&config.base_path);
        }
        if let Ok(absolute) = std::path::absolute(&config.base_path) {
            config.base_path = absolute;
        }

        Self::resolve_executables(&mut config);
        Self::validate(&config)?;

        debug!(
            path = %path.display(),
            workers = config.workers.len(),
            options = config.options.len(),
            pools = config.pools.len(),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Anchor relative executable paths at `base_path` and make them absolute
    ///
    /// Workers run with their executable's directory as working directory, so
    /// a relative program path would be looked up a second time from there.
    pub fn resolve_executables(config: &mut GlobalConfig) {
        let base = config.base_path.clone();
        for option in &mut config.options {
            if option.executable.as_os_str().is_empty() {
                continue;
            }
            if option.executable.is_relative() {
                option.executable = base.join(&option.executable);
            }
            if let Ok(absolute) = std::path::absolute(&option.executable) {
                option.executable = absolute;
            }
        }
    }

    /// Write the configuration as YAML, creating the parent directory if needed
    ///
    /// Impersonation passwords are not written.
    pub fn save(config: &GlobalConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(config)?;
        let save_error = |source| ConfigError::Save {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(save_error)?;
        }
        std::fs::write(path, yaml).map_err(save_error)?;

        debug!(path = %path.display(), workers = config.workers.len(), "configuration saved");
        Ok(())
    }

    /// Validate configuration after loading
    pub fn validate(config: &GlobalConfig) -> Result<(), ConfigError> {
        // Names
        check_names("option", config.options.iter().map(|o| o.name.as_str()))?;
        check_names("worker", config.workers.iter().map(|w| w.name.as_str()))?;
        check_names("pool", config.pools.iter().map(|p| p.name.as_str()))?;

        // Defaults
        if config.default_option.is_empty() {
            return Err(ConfigError::EmptyDefaultOption);
        }
        if config.option(&config.default_option).is_none() {
            return Err(ConfigError::UnknownDefaultOption(
                config.default_option.clone(),
            ));
        }
        if let Some(pool) = config.default_pool.as_deref().filter(|p| !p.is_empty()) {
            if config.pool(pool).is_none() {
                return Err(ConfigError::UnknownDefaultPool(pool.to_string()));
            }
        }

        // Executables
        for option in &config.options {
            if !option.executable.is_file() {
                return Err(ConfigError::ExecutableNotFound {
                    option: option.name.clone(),
                    path: option.executable.clone(),
                });
            }
        }

        // Worker references
        for worker in &config.workers {
            let option = config.option_key_for(worker);
            if config.option(option).is_none() {
                return Err(ConfigError::UnknownOption {
                    worker: worker.name.clone(),
                    option: option.to_string(),
                });
            }

            if let Some(alternate) = worker
                .recovery
                .alternate_option
                .as_deref()
                .filter(|a| !a.is_empty())
            {
                if config.option(alternate).is_none() {
                    return Err(ConfigError::UnknownAlternateOption {
                        worker: worker.name.clone(),
                        option: alternate.to_string(),
                    });
                }
            }

            if let Some(pool) = worker.pool.as_deref().filter(|p| !p.is_empty()) {
                if config.pool(pool).is_none() {
                    return Err(ConfigError::UnknownPool {
                        worker: worker.name.clone(),
                        pool: pool.to_string(),
                    });
                }
            }
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

fn check_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName { kind });
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
