//! bentod - The bento store service
//!
//! Wires together:
//! - Configuration loading
//! - SQLite store (todos, journal, accounts, sessions)
//! - IPC server
//! - Command dispatch

use anyhow::{Context, Result};
use bento_config::load_config_or_default;
use bento_ipc::{IpcServer, ServerMessage};
use bento_store::{Repositories, SqliteStore};
use bento_util::default_config_path;
use bentod::{handle_message, CommandHandler};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// bentod - Store service for the bento planner
#[derive(Parser, Debug)]
#[command(name = "bentod")]
#[command(about = "Store service for the bento planner", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/bento/config.toml)
    #[arg(short, long, env = "BENTO_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Socket path override (or set BENTO_SOCKET env var)
    #[arg(short, long, env = "BENTO_SOCKET")]
    socket: Option<PathBuf>,

    /// Data directory override (or set BENTO_DATA_DIR env var)
    #[arg(short, long, env = "BENTO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    handler: CommandHandler,
    ipc: Arc<IpcServer>,
    store: Arc<SqliteStore>,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(config_path = %args.config.display(), "Configuration loaded");

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| config.service.socket_path.clone());

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| config.service.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join("bento.db");
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?
                .with_min_password_length(config.service.min_password_length),
        );

        info!(
            db_path = %db_path.display(),
            min_password_length = config.service.min_password_length,
            "Store initialized"
        );

        let handler = CommandHandler::new(Repositories::from_backend(store.clone()));

        let mut ipc = IpcServer::new(&socket_path);
        ipc.start()
            .await
            .with_context(|| format!("Failed to listen on {:?}", socket_path))?;

        Ok(Self {
            handler,
            ipc: Arc::new(ipc),
            store,
        })
    }

    async fn run(self) -> Result<()> {
        let mut messages: mpsc::UnboundedReceiver<ServerMessage> = self
            .ipc
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;

        let ipc_accept = self.ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup())
            .context("Failed to create SIGHUP handler")?;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                Some(msg) = messages.recv() => {
                    handle_message(&self.handler, &self.ipc, msg).await;
                }
            }
        }

        info!("Shutting down bentod");

        if !self.store.is_healthy() {
            warn!("Store reported unhealthy at shutdown");
        }
        self.ipc.shutdown();

        info!("Shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "bentod starting");

    let service = Service::new(&args).await?;
    service.run().await
}
