//! Implementation of the `herdsman run` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use super::load_config;
use crate::application::Supervisor;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{StartReport, StopReport};
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file, or directory containing herdsman.yaml
    #[arg(short, long, env = "HERDSMAN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct StartOutput<'a> {
    pub event: &'static str,
    #[serde(flatten)]
    pub report: &'a StartReport,
}

impl CommandOutput for StartOutput<'_> {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Started {} worker(s); press Ctrl-C to stop",
            self.report.started.len()
        )];
        for name in &self.report.started {
            lines.push(format!("  + {name}"));
        }
        for (name, reason) in &self.report.failed {
            lines.push(format!("  ! {name}: {reason}"));
        }
        for name in &self.report.skipped {
            lines.push(format!("  - {name} (disabled)"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct StopOutput<'a> {
    pub event: &'static str,
    #[serde(flatten)]
    pub report: &'a StopReport,
}

impl CommandOutput for StopOutput<'_> {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Stopped {} worker(s)",
            self.report.exited.len() + self.report.killed.len()
        )];
        for name in &self.report.killed {
            lines.push(format!("  ! {name} was killed after the graceful window"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::from_global(&config))?;

    let supervisor = Supervisor::new();
    let report = supervisor
        .start(Arc::new(config))
        .await
        .context("Failed to start supervisor")?;
    output(
        &StartOutput {
            event: "started",
            report: &report,
        },
        json_mode,
    );

    wait_for_shutdown().await?;
    info!("shutdown requested");

    let report = supervisor.stop().await;
    output(
        &StopOutput {
            event: "stopped",
            report: &report,
        },
        json_mode,
    );
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}
