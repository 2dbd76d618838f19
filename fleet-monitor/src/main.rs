use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use fleet_monitor::{
    AppState, api,
    config::{Config, StoreConfig},
    manifest::{CsvManifest, reconcile},
    registry::{
        DeviceRegistry, HeartbeatRegistry, UploadStatRegistry,
        memory::{InMemoryDeviceRegistry, InMemoryHeartbeatRegistry, InMemoryUploadStatRegistry},
        sqlite::{self, SqliteDeviceRegistry, SqliteHeartbeatRegistry, SqliteUploadStatRegistry},
    },
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fleet-monitor")]
#[command(about = "Fleet telemetry monitor")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "fleet-monitor.toml")]
    config: PathBuf,

    /// Device manifest to reconcile at startup, overrides the configured one
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fleet_monitor=info,tower_http=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    if let Some(manifest) = cli.manifest {
        config.manifest.path = manifest;
    }

    let store_kind = config.store.kind();

    match config.store {
        StoreConfig::Memory => {
            info!("Using in-memory registries");
            let state = AppState::new(
                InMemoryDeviceRegistry::new(),
                InMemoryHeartbeatRegistry::new(),
                InMemoryUploadStatRegistry::new(),
            );
            run_server(state, store_kind, config.manifest.path, config.server.http_addr).await?;
        }
        StoreConfig::Sqlite { path } => {
            info!(path = ?path, "Using SQLite registries");
            let pool = sqlite::connect(&path).await?;
            let state = AppState::new(
                SqliteDeviceRegistry::new(pool.clone()),
                SqliteHeartbeatRegistry::new(pool.clone()),
                SqliteUploadStatRegistry::new(pool),
            );
            run_server(state, store_kind, config.manifest.path, config.server.http_addr).await?;
        }
    }

    Ok(())
}

async fn run_server<Dev, H, U>(
    state: AppState<Dev, H, U>,
    store_kind: &'static str,
    manifest_path: PathBuf,
    http_addr: SocketAddr,
) -> color_eyre::Result<()>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    let manifest = CsvManifest::new(manifest_path);
    info!(path = ?manifest.path(), "Reconciling device registry with manifest");
    let report = reconcile(&state.device_registry, &manifest).await?;
    info!(
        manifest_devices = report.manifest_devices,
        added = report.added.len(),
        "Startup complete"
    );

    let app = api::router(state, store_kind);

    let cancel = CancellationToken::new();

    let listener = TcpListener::bind(http_addr).await?;
    info!(%http_addr, "HTTP server listening");

    let cancel_clone = cancel.clone();
    tokio::select! {
        result = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        }) => {
            if let Err(e) = result {
                error!(error = ?e, "HTTP server error");
            }
            info!("HTTP server shut down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            cancel.cancel();
        }
    }

    Ok(())
}
