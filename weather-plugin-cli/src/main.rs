//! Binary crate for the `weather-plugin` local chat host.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Standing in for the chat framework that dispatches commands
//! - Interactive configuration

use clap::Parser;

mod cli;
mod host;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
