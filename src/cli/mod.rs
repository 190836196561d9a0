//! CLI module for Keydesk
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `init-db`: create the key table in PostgreSQL

pub mod init_db;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Keydesk - API key management service
#[derive(Parser)]
#[command(name = "keydesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),

    /// Create the api_keys table and index if missing
    InitDb,
}

/// Load `.env`, configuration and logging shared by all subcommands
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
