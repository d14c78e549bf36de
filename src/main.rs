//! brainstash - personal bookmarking backend with tagged content and
//! public share links.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use brainstash::{http_server, AppState, Config};

/// Personal bookmarking backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Path to SQLite database file (in-memory when omitted)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    tracing::info!("Starting brainstash");

    let listen_addr = SocketAddr::from_str(&format!("0.0.0.0:{}", args.port))?;

    // Fails fast when the signing secret is absent
    let config = match Config::from_env(listen_addr, args.database, log_level) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let state = match AppState::from_config(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(3);
        }
    };

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let graceful_shutdown = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    };
    tokio::spawn(graceful_shutdown);

    let server_config = http_server::Config::new(config.listen_addr, config.log_level);
    http_server::run(server_config, state, shutdown_rx).await?;

    Ok(())
}
