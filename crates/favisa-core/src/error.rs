//! Error types for `favisa-core`.

use thiserror::Error;

use crate::vocabulary::Vocabulary;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{vocabulary} has no entry with key {key:?}")]
  CatalogNotFound { vocabulary: Vocabulary, key: String },

  #[error(
    "{vocabulary} key {key:?} is already registered as {existing:?}; refusing \
     to overwrite with {incoming:?}"
  )]
  CatalogConflict {
    vocabulary: Vocabulary,
    key:        String,
    existing:   String,
    incoming:   String,
  },

  #[error("{vocabulary} entry {key:?} carries metadata for another vocabulary")]
  MetadataMismatch { vocabulary: Vocabulary, key: String },

  #[error("unknown repair table {0:?}")]
  UnknownRepairTable(String),

  #[error("repair table {table}: {detail}")]
  InvalidRepairRule { table: String, detail: String },

  #[error("repair table parse error: {0}")]
  RepairSyntax(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
