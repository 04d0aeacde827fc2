//! Implementation of the `herdsman init` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Preset, PresetSettings};
use crate::infrastructure::config::{ConfigLoader, CONFIG_FILE_NAME};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Starter configuration to write (cuda, quark)
    #[arg(short, long, default_value_t = Preset::Cuda)]
    pub preset: Preset,

    /// Directory that receives herdsman.yaml (defaults to current directory)
    #[arg(short, long, env = "HERDSMAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing configuration
    #[arg(long, short)]
    pub force: bool,

    /// Default pool username
    #[arg(long, default_value = "")]
    pub username: String,

    /// Default pool password
    #[arg(long, default_value = "")]
    pub password: String,

    /// Extra miner arguments for the default worker
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub arguments: String,

    /// Priority level of the default worker (-2 idle .. 3 realtime)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub priority: i16,

    /// Mirror worker output into log files and the status broadcast
    #[arg(long)]
    pub debug_logging: bool,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub path: PathBuf,
    pub preset: Preset,
    pub executable: Option<PathBuf>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if let Some(executable) = self.executable.as_ref().filter(|_| self.success) {
            lines.push(format!(
                "\nInstall the {} miner at {} before running",
                self.preset,
                executable.display()
            ));
        }
        lines.join("\n")
    }
}

pub(crate) fn write_preset(args: &InitArgs) -> Result<InitOutput> {
    let dir = match &args.config {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let path = dir.join(CONFIG_FILE_NAME);

    if path.exists() && !args.force {
        return Ok(InitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            ),
            path,
            preset: args.preset,
            executable: None,
        });
    }

    let config = args.preset.build(&PresetSettings {
        debug_logging: args.debug_logging,
        priority: args.priority,
        username: args.username.clone(),
        password: args.password.clone(),
        arguments: args.arguments.clone(),
    });
    ConfigLoader::save(&config, &path).context("Failed to write configuration")?;

    Ok(InitOutput {
        success: true,
        message: format!("Wrote {} preset to {}", args.preset, path.display()),
        executable: config.options.first().map(|o| dir.join(&o.executable)),
        path,
        preset: args.preset,
    })
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let result = write_preset(&args)?;
    output(&result, json_mode);
    Ok(())
}
