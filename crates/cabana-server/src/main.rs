//! cabana server binary.
//!
//! Reads `cabana.toml` (or the path specified with `--config`) plus any
//! `CABANA_` environment overrides, opens an in-process SQLite store, and
//! serves the pool API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use cabana_core::{ledger::AccessLedger, store::PoolStore as _};
use cabana_store_sqlite::SqliteStore;
use chrono::Utc;
use clap::Parser;
use settings::{ServerConfig, expand_tilde};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pool occupancy and access-control server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cabana.toml")]
  config: PathBuf,

  /// Print the effective configuration as JSON and exit.
  #[arg(long)]
  print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  if cli.print_config {
    println!("{}", serde_json::to_string_pretty(&server_cfg)?);
    return Ok(());
  }

  let offset = server_cfg.offset()?;
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(dir) = store_path.parent()
    && !dir.as_os_str().is_empty()
  {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {}", dir.display()))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let seed = server_cfg.pool.to_config(Utc::now())?;
  let pool = store
    .init_config(seed)
    .await
    .context("failed to initialise pool configuration")?;
  tracing::info!(
    max_capacity = pool.max_capacity,
    max_hours_per_visit = pool.max_hours_per_visit,
    is_active = pool.is_active,
    "pool configuration loaded"
  );

  let ledger = AccessLedger::new(Arc::new(store)).with_utc_offset(offset);
  let app = cabana_api::api_router(ledger).layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    tracing::info!("shutting down");
  }
}
