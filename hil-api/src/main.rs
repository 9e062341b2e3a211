use anyhow::Context;
use clap::Parser;
use hil_switch::{ConsoleConnector, DriverRegistry, MockFabric, MockFactory};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hil_api::rest::{AppState, create_router};
use hil_api::{AuditLogger, Orchestrator, Store, VlanPool, VlanRange};

#[derive(Parser)]
#[command(name = "hil-api")]
#[command(about = "HIL API Server - bare-metal tenant isolation control plane")]
struct Args {
    /// Listen address for REST API
    #[arg(short, long, default_value = "[::]:5000")]
    listen: String,

    /// SQLite database path
    #[arg(short, long, default_value = "/var/lib/hil/hil.db")]
    database: PathBuf,

    /// Run in development mode (in-memory store, mock switches only)
    #[arg(long)]
    dev: bool,

    /// VLAN tags available to networks, e.g. "100-199,300"
    #[arg(long, default_value = "100-199")]
    vlans: String,

    /// Timeout for one switch session in seconds
    #[arg(long, default_value_t = 30)]
    driver_timeout_secs: u64,

    /// TCP port of switch consoles when the host carries none
    #[arg(long, default_value_t = hil_switch::console::DEFAULT_CONSOLE_PORT)]
    console_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hil_api=info".parse()?)
                .add_directive("hil_switch=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let ranges = VlanRange::parse_list(&args.vlans).context("invalid --vlans")?;

    info!(
        listen = %args.listen,
        dev = args.dev,
        vlans = %args.vlans,
        "Starting HIL API server"
    );

    let store = if args.dev {
        warn!("Development mode: state is not persisted");
        Store::in_memory()?
    } else {
        if let Some(parent) = args.database.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        Store::open(&args.database)?
    };
    let store = Arc::new(store);

    let seeded = store.with_transaction(|tx| VlanPool::seed(tx, &ranges))?;
    info!(added = seeded, "Seeded VLAN pool");

    let fabric = MockFabric::new();
    let registry = if args.dev {
        DriverRegistry::builder()
            .factory(Arc::new(MockFactory::new(fabric)))
            .build()
    } else {
        DriverRegistry::with_defaults(
            Arc::new(ConsoleConnector::new(args.console_port)),
            Duration::from_secs(args.driver_timeout_secs),
            fabric,
        )
    };

    let orchestrator = Orchestrator::new(store, Arc::new(registry), Arc::new(AuditLogger::new()))?;
    let state = Arc::new(AppState {
        api: Arc::new(orchestrator),
    });
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!("REST API listening on {}", args.listen);

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await
    });

    let ctrl_c = signal::ctrl_c();
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }

    let _ = shutdown_tx.send(true);
    server.await??;

    info!("Shutdown complete");
    Ok(())
}
