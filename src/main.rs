//! aicommits - AI commit message generator
//!
//! Run without arguments to generate a message for the staged changes,
//! or use `config get|set` to manage settings.
//!
//! Available as the `aicommits` and `aic` commands.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aicommits::cli::commands::{Cli, Commands};
use aicommits::cli::{commit, config};
use aicommits::core::config::ConfigStore;
use aicommits::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let store = match cli.config_file {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::default_location()?,
    };

    match cli.command {
        // Config commands don't require git repository
        Some(Commands::Config(args)) => config::handle_config(args.command, &store),

        None => commit::handle_generate(cli.generate, &store).await,
    }
}
