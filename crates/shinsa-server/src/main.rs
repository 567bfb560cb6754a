//! Task approval backend
//!
//! Serves template seeding, task creation and step approval over HTTP.

use anyhow::Context;
use clap::Parser;
use shinsa_server::{logging, Server, ServiceConfig};

/// Shinsa server CLI
#[derive(Parser)]
#[command(name = "shinsa-server")]
#[command(about = "Task approval workflow backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SHINSA_CONFIG")]
    config: Option<String>,

    /// Listen port (host is taken from the configuration)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Storage endpoint, e.g. memory://
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Database name
    #[arg(long, env = "DATABASE_NAME")]
    database_name: Option<String>,

    /// Log level
    #[arg(long, env = "SHINSA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "SHINSA_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        ServiceConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    if let Some(port) = cli.port {
        config.server.listen_addr.set_port(port);
    }
    if cli.database_url.is_some() {
        config.storage.url = cli.database_url;
    }
    if cli.database_name.is_some() {
        config.storage.database = cli.database_name;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    logging::init(&config.logging)?;

    Server::new(config).run().await?;
    Ok(())
}
