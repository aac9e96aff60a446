//! Error type for `favisa-store-sqlite`.

use favisa_core::vocabulary::Vocabulary;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] favisa_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decode error: {0}")]
  Decode(String),

  /// The debt total no longer fits a `Decimal`.
  #[error("debt total overflows")]
  DebtOverflow,

  #[error("{vocabulary} has no entry with key {key:?}")]
  CatalogNotFound { vocabulary: Vocabulary, key: String },

  /// Deleting a catalog entry that facts still reference.
  #[error("{vocabulary} key {key:?} is referenced by taxpayers")]
  CatalogInUse { vocabulary: Vocabulary, key: String },

  /// Sentinel keys are always valid and may not be removed or renamed.
  #[error("{vocabulary} sentinel {key:?} cannot be changed")]
  SentinelProtected { vocabulary: Vocabulary, key: String },

  #[error("{vocabulary} key {key:?} already exists")]
  CatalogKeyTaken { vocabulary: Vocabulary, key: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
