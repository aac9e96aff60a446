//! `favisa`: load the taxpayer CSV into SQLite and report on it.
//!
//! ```text
//! favisa load [--csv data/contribuyentes.csv] [--json]
//! favisa summary [--top 5] [--json]
//! favisa catalog tax_status [--json]
//! favisa serve [--port 8080]
//! ```
//!
//! Settings come from `favisa.toml` (or `--config`) and `FAVISA__*`
//! environment variables; flags win over both.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use favisa_cli::{
  AppConfig,
  load::{LoadRun, load_csv},
  render,
};
use favisa_core::{
  loader::LoadError, store::TaxpayerStore as _, vocabulary::Vocabulary,
};
use favisa_store_sqlite::SqliteStore;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FAVISA taxpayer catalog loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "favisa.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path`.
  #[arg(long, global = true)]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Normalise the source CSV and load it into an empty store
  Load {
    /// Source file; overrides `csv_path`.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the manifest as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Print the executive summary
  Summary {
    /// Number of districts to rank.
    #[arg(long, default_value_t = 5)]
    top: usize,
    #[arg(long)]
    json: bool,
  },

  /// List one catalog
  Catalog {
    vocabulary: Vocabulary,
    #[arg(long)]
    json: bool,
  },

  /// Serve the read-only JSON API
  Serve {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
  },
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
  let mut cfg = AppConfig::load(&cli.config)?;
  if let Some(store) = cli.store {
    cfg.store_path = store;
  }

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Load { csv, json } => {
      let normalizer = cfg.normalizer()?;
      let csv_path = csv.unwrap_or(cfg.csv_path);
      match load_csv(&store, &normalizer, cfg.loader, &csv_path).await {
        Ok(LoadRun::Skipped { existing }) => {
          println!("store already holds {existing} taxpayers; nothing loaded");
        }
        Ok(LoadRun::Completed(manifest)) => {
          emit(&manifest, json, render::manifest)?;
        }
        Err(e) => {
          // Show how far the batch got before it stopped.
          if let Some(LoadError::ConstraintViolation { manifest, .. }) =
            e.downcast_ref::<LoadError>()
          {
            emit(&**manifest, json, render::manifest)?;
          }
          return Err(e);
        }
      }
    }

    Command::Summary { top, json } => {
      let summary = store.summary(top).await.context("summary query failed")?;
      emit(&summary, json, render::summary)?;
    }

    Command::Catalog { vocabulary, json } => {
      let entries = store
        .list_catalog(vocabulary)
        .await
        .with_context(|| format!("failed to list {vocabulary}"))?;
      emit(entries.as_slice(), json, render::catalog)?;
    }

    Command::Serve { host, port } => {
      let address = format!(
        "{}:{}",
        host.unwrap_or(cfg.host),
        port.unwrap_or(cfg.port)
      );
      let app = axum::Router::new()
        .nest("/api", favisa_api::api_router(Arc::new(store)))
        .layer(TraceLayer::new_for_http());

      tracing::info!("Listening on http://{address}/api");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}

/// Print `value` as pretty JSON or through its text rendering.
fn emit<T: Serialize + ?Sized>(
  value: &T,
  json: bool,
  text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    print!("{}", text(value));
  }
  Ok(())
}
