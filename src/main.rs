//! Campus services.
//!
//! # Architecture Overview
//!
//! ```text
//!   client ──▶ student service ──────────────────────────▶ address service
//!              │ handlers                                  │ rate limit (standard route)
//!              │ AddressProxyService / FlakyService        │ in-memory catalogue
//!              │ Policy: retry → breaker → bulkhead → timeout
//!              │ HttpAddressClient ────── HTTP/JSON ───────┘
//!              └ /admin (registry snapshots, breaker reset)
//! ```
//!
//! One binary, one service per process: `campus-services address` or
//! `campus-services student`, both reading the same TOML file.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use campus_services::config::{load_config, watcher::ConfigWatcher, ServiceConfig};
use campus_services::lifecycle::{wait_for_signal, Shutdown};
use campus_services::observability::{logging, metrics};
use campus_services::{AddressServer, StudentServer};

const DRAIN_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "campus-services")]
#[command(about = "Address catalogue and resilient student service", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand)]
enum Service {
    /// Serve the address catalogue
    Address,
    /// Serve the student API
    Student,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "campus-services starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    // Watcher handle must outlive the server.
    let mut _watcher = None;

    let mut server = match cli.service {
        Service::Address => {
            let listener = TcpListener::bind(&config.address_service.bind_address).await?;
            // Without a file there is nothing to watch; the closed channel
            // leaves the catalogue as loaded.
            let updates = match &cli.config {
                Some(path) => {
                    let (watcher, updates) = ConfigWatcher::new(path);
                    _watcher = Some(watcher.run()?);
                    updates
                }
                None => tokio::sync::mpsc::unbounded_channel().1,
            };

            let server = AddressServer::new(&config);
            let rx = shutdown.subscribe();
            tokio::spawn(async move { server.run(listener, updates, rx).await })
        }
        Service::Student => {
            let listener = TcpListener::bind(&config.student_service.bind_address).await?;
            tracing::info!(
                address_service = %config.student_service.address_base_url,
                "Address service upstream configured"
            );
            let server = StudentServer::new(&config)?;
            let rx = shutdown.subscribe();
            tokio::spawn(async move { server.run(listener, rx).await })
        }
    };

    tokio::select! {
        _ = wait_for_signal() => shutdown.trigger(),
        result = &mut server => {
            match result {
                Ok(Ok(())) => tracing::info!("Server stopped"),
                Ok(Err(e)) => tracing::error!(error = %e, "Server exited with error"),
                Err(e) => tracing::error!(error = %e, "Server task panicked"),
            }
            return Ok(());
        }
    }

    match tokio::time::timeout(DRAIN_DEADLINE, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server exited with error"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task panicked"),
        Err(_) => tracing::warn!("Drain deadline passed, exiting with requests in flight"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
