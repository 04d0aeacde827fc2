//! Implementation of the `herdsman listen` command.

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use crate::domain::models::{ConnectionState, StatusMessage};
use crate::infrastructure::broadcast::{BroadcastClient, BASE_PORT};
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// First port of the listener range
    #[arg(long, default_value_t = BASE_PORT)]
    pub base_port: u16,

    /// Log level for the listener's own diagnostics
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

fn render(status: &StatusMessage, json_mode: bool) -> String {
    if json_mode {
        serde_json::to_string(status).unwrap_or_default()
    } else {
        status.to_string()
    }
}

pub async fn execute(args: ListenArgs, json_mode: bool) -> Result<()> {
    let _logger = LoggerImpl::init(&LogConfig {
        level: args.log_level,
        ..LogConfig::default()
    })?;

    let client = BroadcastClient::with_base_port(args.base_port);
    client.subscribe(move |status: &StatusMessage| println!("{}", render(status, json_mode)));
    client.start();

    let mut state = client.watch_state();
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C")?,
        _ = state.wait_for(|s| *s == ConnectionState::Disconnected) => {
            warn!("broadcast client disconnected");
        }
    }

    client.stop().await;
    Ok(())
}
