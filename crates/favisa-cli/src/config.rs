//! Application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the optional TOML
//! file, then `FAVISA__*` environment variables (`__` separates nesting
//! levels, e.g. `FAVISA__LOADER__MIN_RUC=10000`). CLI flags are applied last
//! by the binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use favisa_core::{
  loader::LoaderConfig, normalize::Normalizer, repair::RepairTables,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub store_path:   PathBuf,
  pub csv_path:     PathBuf,
  pub host:         String,
  pub port:         u16,
  pub loader:       LoaderConfig,
  /// Replacement for the built-in repair tables.
  pub repairs_path: Option<PathBuf>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store_path:   PathBuf::from("favisa.db"),
      csv_path:     PathBuf::from("data/contribuyentes.csv"),
      host:         "127.0.0.1".to_string(),
      port:         8080,
      loader:       LoaderConfig::default(),
      repairs_path: None,
    }
  }
}

impl AppConfig {
  /// Layer `path` (if it exists) and the environment over the defaults.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("FAVISA")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  /// The normaliser for this configuration: the built-in repair tables, or
  /// the operator's file when `repairs_path` is set.
  pub fn normalizer(&self) -> anyhow::Result<Normalizer> {
    let repairs = match &self.repairs_path {
      None => RepairTables::builtin().context("built-in repair tables")?,
      Some(path) => {
        let raw = std::fs::read_to_string(path)
          .with_context(|| format!("reading repair tables {}", path.display()))?;
        RepairTables::from_toml(&raw)
          .with_context(|| format!("invalid repair tables {}", path.display()))?
      }
    };
    Ok(Normalizer::new(repairs))
  }
}
