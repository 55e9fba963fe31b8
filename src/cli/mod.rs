pub mod commands;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "zoo-api")]
#[command(about = "Animals REST API server and administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Serve the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create a user directly in the store, optionally as admin")]
    CreateUser(commands::user::CreateUserArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Postgres when `DATABASE_URL` is set, otherwise a process-local store.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match &config.database.url {
        Some(url) => Ok(Arc::new(PgStore::connect(url, &config.database).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::CreateUser(args) => commands::user::handle(config, args, output_format).await,
    }
}
