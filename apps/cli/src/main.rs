//! ProfileScout CLI — batch identity enrichment over a chat command channel.
//!
//! Resolves a batch of opaque subject identifiers through an external
//! resolver bot, scrapes each resolved profile page, and forwards
//! high-value or private-inventory hits to webhook sinks.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
