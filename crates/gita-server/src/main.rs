//! gita-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the verse API over HTTP.
//!
//! # Loading legacy data
//!
//! ```sh
//! cargo run -p gita-server -- --migrate legacy-verses.json
//! ```
//!
//! runs the batch transform over a JSON array of legacy records and exits.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use gita_core::service::VerseService;
use gita_server::{ServerConfig, expand_tilde};
use gita_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gita verse API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Migrate a JSON array of legacy verse records into the store and exit.
  #[arg(long, value_name = "FILE")]
  migrate: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = ?store_path, "store opened");

  let service = Arc::new(
    VerseService::new(Arc::new(store.clone())).with_max_limit(server_cfg.max_page_limit),
  );

  if let Some(file) = cli.migrate {
    let raw = tokio::fs::read(&file)
      .await
      .with_context(|| format!("failed to read {file:?}"))?;
    let records: Vec<serde_json::Value> = serde_json::from_slice(&raw)
      .with_context(|| format!("{file:?} is not a JSON array"))?;
    tracing::info!(records = records.len(), "starting migration");

    let report = service.migrate(records).await;
    println!(
      "created: {}, updated: {}, failed: {}",
      report.created, report.updated, report.failed
    );
  } else {
    let app = gita_server::app(service);
    let address = server_cfg.address();

    tracing::info!("Listening on http://{address}");
    let listener = TcpListener::bind(&address)
      .await
      .with_context(|| format!("failed to bind {address}"))?;

    axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await
      .context("server error")?;
  }

  store.close().await.context("failed to close store")?;
  tracing::info!("store closed");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
