//! Binary crate for the `weather-bot` Telegram bot.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging to stdout and a rotating file
//! - Wiring the core pipeline to real clients

use clap::Parser;

mod cli;
mod logging;
mod rotating;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
