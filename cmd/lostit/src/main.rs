//! # lostit
//!
//! Assembles the scanner, the catalog client and the local engine from
//! configuration, then runs one subcommand.

mod cli;
mod commands;
mod wiring;

use anyhow::{Context, Result};
use clap::Parser;
use configs::AppConfig;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use wiring::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Logging: RUST_LOG wins, otherwise our crates at info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lostit=info,services=info,warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    // 2. Configuration
    let config = AppConfig::load().context("loading configuration")?;
    let app = App::new(config, cli.token);

    // 3. Dispatch
    match cli.command {
        Command::Scan { file, no_local, json } => commands::scan(&app, &file, no_local, json).await,
        Command::Engine { bind } => commands::engine(&app, bind).await,
        Command::Items { action } => commands::items(&app, action).await,
        Command::Auth { action } => commands::auth(&app, action).await,
        Command::Tag { image } => commands::tag(&app, &image).await,
        Command::Chat => commands::chat(&app).await,
    }
}
