//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use super::commands::init::InitArgs;
use super::commands::listen::ListenArgs;
use super::commands::run::RunArgs;
use super::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(name = "herdsman")]
#[command(about = "Herdsman - miner process supervisor", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the configured workers and supervise them until interrupted
    Run(RunArgs),

    /// Print status messages broadcast by a running supervisor
    Listen(ListenArgs),

    /// Load and validate a configuration without starting anything
    Validate(ValidateArgs),

    /// Write a starter configuration from a built-in preset
    Init(InitArgs),
}
