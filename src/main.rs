//! alertmux service binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  ALERTMUX                    │
//!                       │                                              │
//!   Save/Delete/Get     │  ┌───────┐   ┌─────────┐   ┌─────────────┐   │
//!   ────────────────────┼─▶│  api  │──▶│ manager │──▶│ConfigStore  │   │
//!                       │  └───────┘   └────┬────┘   └──────┬──────┘   │
//!                       │                   │               │          │
//!                       │                   ▼               ▼          │
//!                       │            ┌────────────┐  ┌────────────┐    │
//!                       │            │MergeEngine │  │ Reconciler │    │
//!                       │            └─────┬──────┘  └─────┬──────┘    │
//!                       │                  │               │           │
//!                       │                  ▼               ▼           │
//!                       │            ┌──────────────────────────┐      │
//!                       │            │       InstancePool       │      │
//!                       │            │  tenant → RunningInstance│      │
//!                       │            └──────────────────────────┘      │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Startup order: config → observability → store → first sync (readiness
//! gate) → sync loop + management API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use alertmux::api::{self, ApiState};
use alertmux::config::{load_config, ServiceConfig, StorageBackend};
use alertmux::engine::TreeEngine;
use alertmux::lifecycle::Shutdown;
use alertmux::manager::TenantManager;
use alertmux::observability::{logging, metrics};
use alertmux::pool::InstancePool;
use alertmux::reconcile::Reconciler;
use alertmux::store::{ConfigStore, FileStore, MemoryStore};

#[derive(Parser)]
#[command(name = "alertmux")]
#[command(about = "Multi-tenant alert-notification routing service", long_about = None)]
struct Args {
    /// Path to the service configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("alertmux v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store: Arc<dyn ConfigStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::open(&config.storage.path)?),
    };

    let pool = Arc::new(InstancePool::new(Arc::new(TreeEngine)));
    let reconciler = Arc::new(Reconciler::new(
        store.clone(),
        pool.clone(),
        Duration::from_secs(config.sync.interval_secs),
        Duration::from_millis(config.sync.jitter_ms),
    ));

    // Startup sync is the readiness gate: the API only comes up once every
    // provisioned tenant has been reconciled (or its failure recorded).
    let report = reconciler.sync_all().await?;
    tracing::info!(
        applied = report.applied,
        unchanged = report.unchanged,
        failed = report.failures.len(),
        "Startup reconciliation complete"
    );

    let shutdown = Shutdown::new();
    let (nudge_tx, nudge_rx) = mpsc::unbounded_channel();

    let manager = Arc::new(TenantManager::new(
        store.clone(),
        pool.clone(),
        Some(nudge_tx),
    ));

    tokio::spawn(reconciler.clone().run(nudge_rx, shutdown.subscribe()));

    let state = ApiState {
        manager,
        pool,
        api_key: Arc::new(config.api.api_key.clone()),
    };
    let router = api::build_router(
        state,
        Duration::from_secs(config.api.request_timeout_secs),
    );
    let listener = TcpListener::bind(&config.api.bind_address).await?;

    let server = tokio::spawn(api::serve(router, listener, shutdown.subscribe()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();

    let _ = server.await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
