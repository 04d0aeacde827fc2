//! Built-in starter configurations
//!
//! Each preset yields a complete configuration with one option template, one
//! pool and a single `Default` worker pointed at that pool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::config::{
    GlobalConfig, LogPolicy, OptionTemplate, Pool, ProcessPolicy, RecoveryPolicy, WorkerSpec,
};

/// Name of the single worker every preset defines
pub const PRESET_WORKER_NAME: &str = "Default";

const PRESET_LOG_MAX_BYTES: u64 = 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CUDA miner for GeForce cards
    Cuda,
    /// CPU miner for the quark algorithm
    Quark,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cuda => write!(f, "cuda"),
            Self::Quark => write!(f, "quark"),
        }
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cuda" | "geforce" => Ok(Self::Cuda),
            "quark" => Ok(Self::Quark),
            _ => Err(anyhow::anyhow!("Invalid preset: {s}. Must be one of: cuda, quark")),
        }
    }
}

/// Caller-supplied values folded into a preset
#[derive(Debug, Clone, Default)]
pub struct PresetSettings {
    pub debug_logging: bool,
    pub priority: i16,
    pub username: String,
    pub password: String,
    pub arguments: String,
}

impl Preset {
    fn option(self) -> OptionTemplate {
        let (name, executable, argument_format) = match self {
            Self::Cuda => (
                "cuda",
                "packages/cuda/cuda",
                " --url={host}:{port} --userpass={username}:{password} {args}",
            ),
            Self::Quark => (
                "quark",
                "packages/qrk/quark",
                " -a quark -q --url {host}:{port} -u {username} -p {password} {args}",
            ),
        };
        OptionTemplate {
            name: name.to_string(),
            executable: PathBuf::from(executable),
            argument_format: argument_format.to_string(),
            arguments: String::new(),
        }
    }

    fn pool(self) -> Pool {
        match self {
            Self::Cuda => Pool {
                name: "Give-Me-Coins".to_string(),
                host: "ftc.give-me-coins.com".to_string(),
                port: 3336,
                website: Some("http://www.give-me-coins.com".to_string()),
            },
            Self::Quark => Pool {
                name: "coinmine".to_string(),
                host: "qrk.coinmine.pl".to_string(),
                port: 6010,
                website: Some("http://www2.coinmine.pl/qrk/".to_string()),
            },
        }
    }

    /// Build the preset's configuration
    ///
    /// The executable path is relative to the configuration directory, so
    /// the miner binary has to be installed there before the config validates.
    pub fn build(self, settings: &PresetSettings) -> GlobalConfig {
        let option = self.option();
        let pool = self.pool();

        let worker = WorkerSpec {
            pool: Some(pool.name.clone()),
            arguments: Some(settings.arguments.trim().to_string()).filter(|a| !a.is_empty()),
            status_updates: false,
            log: LogPolicy {
                enabled: false,
                max_bytes: PRESET_LOG_MAX_BYTES,
            },
            recovery: RecoveryPolicy::default(),
            process: ProcessPolicy {
                priority: settings.priority,
                ..ProcessPolicy::default()
            },
            ..WorkerSpec::new(PRESET_WORKER_NAME, option.name.clone())
        };

        GlobalConfig {
            debug_logging: settings.debug_logging,
            default_username: settings.username.trim().to_string(),
            default_password: settings.password.trim().to_string(),
            default_option: option.name.clone(),
            default_pool: Some(pool.name.clone()),
            options: vec![option],
            pools: vec![pool],
            workers: vec![worker],
            ..GlobalConfig::default()
        }
    }
}
