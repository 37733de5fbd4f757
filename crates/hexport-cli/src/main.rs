mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use hexport_config::Config;

fn main() -> Result<()> {
    // Diagnostics go to stderr, stdout carries the summary
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    commands::export::handle(cli, &config)
}
