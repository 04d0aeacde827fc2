//! Herdsman CLI entry point.

use clap::Parser;

use herdsman::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Each command installs its tracing subscriber once its log settings are known
    let result = match cli.command {
        Commands::Run(args) => herdsman::cli::commands::run::execute(args, cli.json).await,
        Commands::Listen(args) => herdsman::cli::commands::listen::execute(args, cli.json).await,
        Commands::Validate(args) => {
            herdsman::cli::commands::validate::execute(args, cli.json).await
        }
        Commands::Init(args) => herdsman::cli::commands::init::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        herdsman::cli::handle_error(err, cli.json);
    }
}
