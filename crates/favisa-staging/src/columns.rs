use csv::ByteRecord;
use favisa_core::staging::StagedRow;

use crate::{Error, Result};

/// Source column names, in [`Field`] order.
pub const COLUMNS: [&str; 10] = [
  "ddp_numruc",
  "ddp_ciiu",
  "ddp_tpoemp",
  "ddp_tamano",
  "ddp_ubigeo",
  "ddp_estado",
  "ddp_flag22",
  "dds_sexo",
  "dds_edad",
  "deuda",
];

/// Position of each required column in the source header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap([usize; 10]);

impl ColumnMap {
  /// Locate every required column in `headers`. Matching ignores case and
  /// surrounding whitespace; a leading UTF-8 byte-order mark is dropped.
  pub fn from_headers(headers: &ByteRecord) -> Result<Self> {
    let names: Vec<String> = headers
      .iter()
      .map(|h| {
        let h = h.strip_prefix(b"\xef\xbb\xbf").unwrap_or(h);
        latin1(h).trim().to_lowercase()
      })
      .collect();

    let mut indices = [0usize; 10];
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
      *slot = names
        .iter()
        .position(|n| n == column)
        .ok_or(Error::MissingColumn(column))?;
    }
    Ok(Self(indices))
  }

  /// Build a staged row from one record. Short records yield `None` for
  /// the missing fields.
  pub fn stage(&self, record: &ByteRecord, line: Option<u64>) -> StagedRow {
    let field = |i: usize| {
      record
        .get(self.0[i])
        .map(latin1)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
    };
    StagedRow {
      line,
      ruc: field(0),
      activity: field(1),
      company_type: field(2),
      company_size: field(3),
      location: field(4),
      tax_status: field(5),
      domicile_condition: field(6),
      sex: field(7),
      age: field(8),
      debt: field(9),
    }
  }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
pub fn latin1(bytes: &[u8]) -> String { bytes.iter().map(|&b| char::from(b)).collect() }

#[cfg(test)]
mod tests {
  use super::*;

  fn record(fields: &[&[u8]]) -> ByteRecord { ByteRecord::from(fields.to_vec()) }

  #[test]
  fn latin1_decodes_high_bytes() {
    assert_eq!(latin1(b"\xc1ncash"), "Áncash");
    assert_eq!(latin1(b"peque\xf1a"), "pequeña");
  }

  #[test]
  fn headers_found_in_any_order() {
    let mut names: Vec<&[u8]> = COLUMNS.iter().rev().map(|c| c.as_bytes()).collect();
    names.insert(3, b"condicion");
    let map = ColumnMap::from_headers(&record(&names)).unwrap();
    // deuda is first once reversed
    assert_eq!(map.0[9], 0);
    assert_eq!(map.0[0], 10);
  }

  #[test]
  fn headers_ignore_case_and_whitespace() {
    let names: Vec<String> =
      COLUMNS.iter().map(|c| format!(" {} ", c.to_uppercase())).collect();
    let names: Vec<&[u8]> = names.iter().map(|n| n.as_bytes()).collect();
    assert!(ColumnMap::from_headers(&record(&names)).is_ok());
  }

  #[test]
  fn missing_header_is_named() {
    let names: Vec<&[u8]> = COLUMNS
      .iter()
      .filter(|c| **c != "dds_edad")
      .map(|c| c.as_bytes())
      .collect();
    let err = ColumnMap::from_headers(&record(&names)).unwrap_err();
    assert!(matches!(err, Error::MissingColumn("dds_edad")));
  }

  #[test]
  fn stage_trims_and_empties() {
    let names: Vec<&[u8]> = COLUMNS.iter().map(|c| c.as_bytes()).collect();
    let map = ColumnMap::from_headers(&record(&names)).unwrap();
    let row = map.stage(
      &record(&[
        b" 20123456789 ",
        b"",
        b"A7",
        b"M",
        b"021809",
        b"2ACTIVO",
        b"2HABIDO",
        b"H",
        b"   ",
        b"150.00",
      ]),
      Some(2),
    );
    assert_eq!(row.line, Some(2));
    assert_eq!(row.ruc.as_deref(), Some("20123456789"));
    assert_eq!(row.activity, None);
    assert_eq!(row.domicile_condition.as_deref(), Some("2HABIDO"));
    assert_eq!(row.age, None);
    assert_eq!(row.debt.as_deref(), Some("150.00"));
  }
}
