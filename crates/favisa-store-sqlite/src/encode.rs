//! Encoding and decoding helpers between domain types and the plain column
//! values stored in SQLite.
//!
//! Timestamps are RFC 3339 strings. Debt is canonical decimal text. Catalog
//! tables share one shape: key column, description column, then zero to
//! three optional text columns depending on the vocabulary.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use favisa_core::{
  catalog::{CatalogEntry, EntryMetadata},
  report::AnalysisResult,
  taxpayer::{Age, Described, Ruc, Sex, Taxpayer, TaxpayerView},
  vocabulary::Vocabulary,
};
use rust_decimal::Decimal;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_ruc(ruc: Ruc) -> i64 {
  // `Ruc::new` guarantees the value fits.
  ruc.get() as i64
}

pub fn decode_ruc(v: i64) -> Result<Ruc> {
  u64::try_from(v)
    .ok()
    .and_then(Ruc::new)
    .ok_or_else(|| Error::Decode(format!("ruc {v} out of range")))
}

pub fn encode_sex(s: Sex) -> String { s.to_string() }

pub fn decode_sex(s: &str) -> Result<Sex> {
  s.parse().map_err(|_| Error::Decode(format!("unknown sex {s:?}")))
}

pub fn decode_age(v: Option<i64>) -> Result<Option<Age>> {
  v.map(|years| {
    u8::try_from(years)
      .ok()
      .and_then(Age::new)
      .ok_or_else(|| Error::Decode(format!("age {years} out of range")))
  })
  .transpose()
}

pub fn encode_debt(d: Decimal) -> String { d.to_string() }

pub fn decode_debt(s: &str) -> Result<Decimal> {
  Decimal::from_str(s).map_err(|e| Error::Decode(format!("debt {s:?}: {e}")))
}

// ─── Catalog layout ──────────────────────────────────────────────────────────

pub fn description_column(v: Vocabulary) -> &'static str {
  match v {
    Vocabulary::Location => "nombre_distrito",
    _ => "descripcion",
  }
}

/// The optional metadata columns of a catalog table, in storage order.
pub fn extra_columns(v: Vocabulary) -> &'static [&'static str] {
  match v {
    Vocabulary::Activity => &["seccion", "division"],
    Vocabulary::CompanyType => &["abreviatura"],
    Vocabulary::CompanySize => &["criterio_ventas"],
    Vocabulary::Location => &["provincia", "departamento", "ubigeo_codigo"],
    Vocabulary::TaxStatus | Vocabulary::DomicileCondition => &[],
  }
}

/// `key, description, extras…` for a `SELECT`.
pub fn catalog_select_list(v: Vocabulary) -> String {
  std::iter::once(v.key_column())
    .chain(std::iter::once(description_column(v)))
    .chain(extra_columns(v).iter().copied())
    .collect::<Vec<_>>()
    .join(", ")
}

pub fn encode_extras(metadata: &EntryMetadata) -> Vec<Option<String>> {
  match metadata.clone() {
    EntryMetadata::Activity { seccion, division } => vec![seccion, division],
    EntryMetadata::CompanyType { abreviatura } => vec![abreviatura],
    EntryMetadata::CompanySize { criterio_ventas } => vec![criterio_ventas],
    EntryMetadata::Location { provincia, departamento, ubigeo_codigo } => {
      vec![provincia, departamento, ubigeo_codigo]
    }
    EntryMetadata::Plain => vec![],
  }
}

fn decode_extras(v: Vocabulary, extras: Vec<Option<String>>) -> EntryMetadata {
  let mut it = extras.into_iter();
  let mut next = || it.next().flatten();
  match v {
    Vocabulary::Activity => EntryMetadata::Activity { seccion: next(), division: next() },
    Vocabulary::CompanyType => EntryMetadata::CompanyType { abreviatura: next() },
    Vocabulary::CompanySize => EntryMetadata::CompanySize { criterio_ventas: next() },
    Vocabulary::Location => EntryMetadata::Location {
      provincia:     next(),
      departamento:  next(),
      ubigeo_codigo: next(),
    },
    Vocabulary::TaxStatus | Vocabulary::DomicileCondition => EntryMetadata::Plain,
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a catalog table row.
pub struct RawCatalogEntry {
  pub key:         String,
  pub description: String,
  pub extras:      Vec<Option<String>>,
}

impl RawCatalogEntry {
  /// Read `key, description, extras…` as laid out by [`catalog_select_list`].
  pub fn from_row(v: Vocabulary, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let extras = (0..extra_columns(v).len())
      .map(|i| row.get::<_, Option<String>>(i + 2))
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Self { key: row.get(0)?, description: row.get(1)?, extras })
  }

  pub fn into_entry(self, v: Vocabulary) -> CatalogEntry {
    CatalogEntry {
      key:         self.key,
      description: self.description,
      metadata:    decode_extras(v, self.extras),
    }
  }
}

/// Raw values read from a `contribuyente` row.
pub struct RawTaxpayer {
  pub ruc:                i64,
  pub activity:           String,
  pub company_type:       String,
  pub company_size:       String,
  pub location:           String,
  pub tax_status:         String,
  pub domicile_condition: String,
  pub sex:                String,
  pub age:                Option<i64>,
  pub debt:               String,
}

pub const TAXPAYER_COLUMNS: &str = "ruc, id_ciiu, id_tipo_empresa, id_tamano, \
  id_ubicacion, id_estado, id_condicion, sexo, edad, deuda";

impl RawTaxpayer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ruc:                row.get(0)?,
      activity:           row.get(1)?,
      company_type:       row.get(2)?,
      company_size:       row.get(3)?,
      location:           row.get(4)?,
      tax_status:         row.get(5)?,
      domicile_condition: row.get(6)?,
      sex:                row.get(7)?,
      age:                row.get(8)?,
      debt:               row.get(9)?,
    })
  }

  pub fn into_taxpayer(self) -> Result<Taxpayer> {
    Ok(Taxpayer {
      ruc:                decode_ruc(self.ruc)?,
      activity:           self.activity,
      company_type:       self.company_type,
      company_size:       self.company_size,
      location:           self.location,
      tax_status:         self.tax_status,
      domicile_condition: self.domicile_condition,
      sex:                decode_sex(&self.sex)?,
      age:                decode_age(self.age)?,
      debt:               decode_debt(&self.debt)?,
    })
  }
}

/// Raw values read from `v_contribuyente_detalle`.
pub struct RawTaxpayerView {
  pub ruc:         i64,
  /// `(key, description)` pairs in vocabulary order.
  pub described:   [(String, String); 6],
  pub province:    Option<String>,
  pub department:  Option<String>,
  pub sex:         String,
  pub age:         Option<i64>,
  pub debt:        String,
}

pub const VIEW_COLUMNS: &str = "ruc, id_ciiu, actividad, id_tipo_empresa, \
  tipo_empresa, id_tamano, tamano, id_ubicacion, distrito, id_estado, estado, \
  id_condicion, condicion, provincia, departamento, sexo, edad, deuda";

impl RawTaxpayerView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let pair = |i: usize| -> rusqlite::Result<(String, String)> {
      Ok((row.get(i)?, row.get(i + 1)?))
    };
    Ok(Self {
      ruc:        row.get(0)?,
      described:  [pair(1)?, pair(3)?, pair(5)?, pair(7)?, pair(9)?, pair(11)?],
      province:   row.get(13)?,
      department: row.get(14)?,
      sex:        row.get(15)?,
      age:        row.get(16)?,
      debt:       row.get(17)?,
    })
  }

  pub fn into_view(self) -> Result<TaxpayerView> {
    let [activity, company_type, company_size, location, tax_status, domicile] =
      self.described.map(|(key, description)| Described { key, description });
    Ok(TaxpayerView {
      ruc: decode_ruc(self.ruc)?,
      activity,
      company_type,
      company_size,
      location,
      province: self.province,
      department: self.department,
      tax_status,
      domicile_condition: domicile,
      sex: decode_sex(&self.sex)?,
      age: decode_age(self.age)?,
      debt: decode_debt(&self.debt)?,
    })
  }
}

/// Raw values read from a `resultado_analisis` row.
pub struct RawAnalysisResult {
  pub id:            i64,
  pub analysis:      String,
  pub category:      Option<String>,
  pub metric:        Option<String>,
  pub numeric_value: Option<f64>,
  pub text_value:    Option<String>,
  pub executed_at:   String,
}

pub const RESULT_COLUMNS: &str = "id, nombre_analisis, categoria, metrica, \
  valor_numerico, valor_texto, fecha_ejecucion";

impl RawAnalysisResult {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      analysis:      row.get(1)?,
      category:      row.get(2)?,
      metric:        row.get(3)?,
      numeric_value: row.get(4)?,
      text_value:    row.get(5)?,
      executed_at:   row.get(6)?,
    })
  }

  pub fn into_result(self) -> Result<AnalysisResult> {
    Ok(AnalysisResult {
      id:            self.id,
      analysis:      self.analysis,
      category:      self.category,
      metric:        self.metric,
      numeric_value: self.numeric_value,
      text_value:    self.text_value,
      executed_at:   decode_dt(&self.executed_at)?,
    })
  }
}
