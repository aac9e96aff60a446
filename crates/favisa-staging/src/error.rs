//! Error types for the staging reader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("source has no {0:?} column")]
  MissingColumn(&'static str),

  /// A record the CSV layer could not read; `line` is 1-based.
  #[error("line {line:?}: {source}")]
  Record {
    line:   Option<u64>,
    #[source]
    source: csv::Error,
  },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
