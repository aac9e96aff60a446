//! Staging codec for the taxpayer source file.
//!
//! Reads the latin-1 encoded CSV export into [`StagedRow`] values. Columns
//! are addressed by header name, every field is trimmed, and an empty field
//! becomes `None`. Pure synchronous; no database dependencies.
//!
//! ```no_run
//! let rows = favisa_staging::open("data/contribuyentes.csv").unwrap();
//! for row in rows {
//!   match row {
//!     Ok(staged) => println!("{:?}", staged.ruc),
//!     Err(e) => eprintln!("skipped: {e}"),
//!   }
//! }
//! ```

mod columns;
pub mod error;
mod reader;

use std::{fs::File, io::Read, path::Path};

pub use columns::COLUMNS;
pub use error::{Error, Result};
use favisa_core::staging::StagedRow;
pub use reader::StagedReader;

/// Open the CSV file at `path`.
pub fn open(path: impl AsRef<Path>) -> Result<StagedReader<File>> {
  let file = File::open(path.as_ref())?;
  StagedReader::new(file)
}

/// Read staged rows from any byte source.
pub fn from_reader<R: Read>(source: R) -> Result<StagedReader<R>> {
  StagedReader::new(source)
}

/// Read a whole in-memory document; handy for small fixtures.
pub fn read_all(input: &[u8]) -> Result<Vec<Result<StagedRow>>> {
  Ok(from_reader(input)?.collect())
}
