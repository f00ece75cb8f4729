//! GraphQL relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!    Browser                 ┌──────────────────────────────────────────┐
//!    POST /api/graphql-proxy │                 RELAY                    │
//!    X-Original-URL: <url>   │                                          │
//!  ─────────────────────────▶│  middleware ──▶ relay handler ──▶ target │──▶ Upstream
//!                            │  (request id,   (header, allow-   policy │    GraphQL
//!  ◀─────────────────────────│   trace, cors,   list, forward,          │◀── server
//!    JSON or error envelope  │   limits)        map response)           │
//!                            │                                          │
//!                            │  config + watcher · logging · metrics    │
//!                            │  signals · graceful shutdown             │
//!                            └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use graphql_relay::lifecycle::startup::{self, StartupOptions};
use graphql_relay::observability::logging;

#[derive(Parser)]
#[command(name = "graphql-relay")]
#[command(about = "Same-origin relay for third-party GraphQL endpoints", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (watched for changes).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = StartupOptions {
        config_path: cli.config,
        bind_override: cli.bind,
    };

    let config = startup::load(&options)?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "graphql-relay starting");

    startup::run(config, options.config_path.as_deref()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
