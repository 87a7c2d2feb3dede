//! Amity CLI
//!
//! Sends, accepts and denies friend requests and answers relationship
//! queries against a local SQLite database.

mod cli;
mod commands;
mod config;

use std::process;
use std::sync::Arc;

use amity_engine::FriendshipEngine;
use amity_store::SqliteStore;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,amity_cli={level},amity_engine={level},amity_store={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    tracing::debug!(database = %config.database.display(), "Using database");

    let store = Arc::new(SqliteStore::new(&config.database)?);
    let engine = FriendshipEngine::new(store.clone(), store.clone(), config.engine)?;

    commands::execute(cli.command, store, &engine).await
}
