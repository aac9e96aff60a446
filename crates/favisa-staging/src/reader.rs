use std::io::Read;

use csv::ByteRecord;
use favisa_core::staging::StagedRow;

use crate::{Error, Result, columns::ColumnMap};

/// Streams [`StagedRow`]s out of a CSV source, one `Result` per record.
///
/// A record the CSV layer rejects yields [`Error::Record`] and the stream
/// moves on to the next record. An I/O failure ends the stream after it has
/// been reported once.
#[derive(Debug)]
pub struct StagedReader<R> {
  inner:   csv::Reader<R>,
  columns: ColumnMap,
  record:  ByteRecord,
  done:    bool,
}

impl<R: Read> StagedReader<R> {
  pub fn new(source: R) -> Result<Self> {
    let mut inner = csv::ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .from_reader(source);
    let columns = ColumnMap::from_headers(inner.byte_headers()?)?;
    Ok(Self { inner, columns, record: ByteRecord::new(), done: false })
  }
}

impl<R: Read> Iterator for StagedReader<R> {
  type Item = Result<StagedRow>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.inner.read_byte_record(&mut self.record) {
      Ok(false) => {
        self.done = true;
        None
      }
      Ok(true) => {
        let line = self.record.position().map(|p| p.line());
        Some(Ok(self.columns.stage(&self.record, line)))
      }
      Err(source) => {
        let line = source.position().map(|p| p.line());
        if matches!(source.kind(), csv::ErrorKind::Io(_)) {
          self.done = true;
        }
        tracing::debug!(?line, error = %source, "unreadable record");
        Some(Err(Error::Record { line, source }))
      }
    }
  }
}
