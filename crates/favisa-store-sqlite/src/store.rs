//! [`SqliteStore`], the SQLite implementation of [`TaxpayerStore`].

use std::path::Path;

use chrono::Utc;
use favisa_core::{
  catalog::CatalogEntry,
  report::{
    AnalysisResult, CategoryCount, DebtSummary, NewAnalysisResult, Summary,
    TableCount,
  },
  store::{CatalogWrite, InsertOutcome, TaxpayerQuery, TaxpayerStore},
  taxpayer::{Ruc, Taxpayer, TaxpayerView},
  vocabulary::Vocabulary,
};
use rusqlite::OptionalExtension as _;
use rust_decimal::Decimal;

use crate::{
  Error, Result,
  encode::{
    RESULT_COLUMNS, RawAnalysisResult, RawCatalogEntry, RawTaxpayer,
    RawTaxpayerView, TAXPAYER_COLUMNS, VIEW_COLUMNS, catalog_select_list,
    decode_debt, description_column, encode_debt, encode_dt, encode_extras,
    encode_ruc, encode_sex, extra_columns,
  },
  schema::{SCHEMA, TABLES},
};

// Extended result codes (sqlite3.h); stable across SQLite releases.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
// ON DELETE RESTRICT reports through the trigger code.
const SQLITE_CONSTRAINT_TRIGGER: i32 = 1811;

/// The extended code of a constraint failure, if `e` is one.
fn constraint_code(e: &rusqlite::Error) -> Option<i32> {
  match e {
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Some(f.extended_code)
    }
    _ => None,
  }
}

/// Outcome of a catalog maintenance statement, decided inside the
/// connection thread.
enum CatalogChange {
  Done,
  Missing,
  InUse,
  Taken,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A taxpayer store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(?path, "store opened");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn guard_sentinel(vocabulary: Vocabulary, key: &str) -> Result<()> {
    if key == vocabulary.sentinel() {
      return Err(Error::SentinelProtected { vocabulary, key: key.to_owned() });
    }
    Ok(())
  }
}

// ─── TaxpayerStore impl ──────────────────────────────────────────────────────

impl TaxpayerStore for SqliteStore {
  type Error = Error;

  // ── Catalogs ──────────────────────────────────────────────────────────────

  async fn ensure_catalog_entry(
    &self,
    vocabulary: Vocabulary,
    entry: CatalogEntry,
  ) -> Result<CatalogWrite> {
    if !entry.metadata.fits(vocabulary) {
      return Err(
        favisa_core::Error::MetadataMismatch { vocabulary, key: entry.key }.into(),
      );
    }

    let key_col = vocabulary.key_column();
    let columns: Vec<&str> = [key_col, description_column(vocabulary)]
      .into_iter()
      .chain(extra_columns(vocabulary).iter().copied())
      .collect();
    let placeholders: Vec<String> =
      (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({key_col}) DO NOTHING",
      vocabulary.table(),
      columns.join(", "),
      placeholders.join(", "),
    );

    let key = entry.key.clone();
    let mut values = vec![Some(entry.key), Some(entry.description)];
    values.extend(encode_extras(&entry.metadata));

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params_from_iter(values))? > 0)
      })
      .await?;

    if inserted {
      return Ok(CatalogWrite::Inserted);
    }
    let existing = self
      .get_catalog_entry(vocabulary, key.clone())
      .await?
      .ok_or(Error::CatalogNotFound { vocabulary, key })?;
    Ok(CatalogWrite::Existing(existing))
  }

  async fn get_catalog_entry(
    &self,
    vocabulary: Vocabulary,
    key: String,
  ) -> Result<Option<CatalogEntry>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE {} = ?1",
      catalog_select_list(vocabulary),
      vocabulary.table(),
      vocabulary.key_column(),
    );

    let raw: Option<RawCatalogEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], |row| {
              RawCatalogEntry::from_row(vocabulary, row)
            })
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(|r| r.into_entry(vocabulary)))
  }

  async fn list_catalog(&self, vocabulary: Vocabulary) -> Result<Vec<CatalogEntry>> {
    let sql = format!(
      "SELECT {} FROM {} ORDER BY {}",
      catalog_select_list(vocabulary),
      vocabulary.table(),
      vocabulary.key_column(),
    );

    let raws: Vec<RawCatalogEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| RawCatalogEntry::from_row(vocabulary, row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(|r| r.into_entry(vocabulary)).collect())
  }

  async fn remove_catalog_entry(
    &self,
    vocabulary: Vocabulary,
    key: String,
  ) -> Result<()> {
    Self::guard_sentinel(vocabulary, &key)?;
    let sql = format!(
      "DELETE FROM {} WHERE {} = ?1",
      vocabulary.table(),
      vocabulary.key_column(),
    );

    let key_arg = key.clone();
    let change = self
      .conn
      .call(move |conn| match conn.execute(&sql, rusqlite::params![key_arg]) {
        Ok(0) => Ok(CatalogChange::Missing),
        Ok(_) => Ok(CatalogChange::Done),
        Err(e)
          if matches!(
            constraint_code(&e),
            Some(SQLITE_CONSTRAINT_FOREIGNKEY | SQLITE_CONSTRAINT_TRIGGER)
          ) =>
        {
          Ok(CatalogChange::InUse)
        }
        Err(e) => Err(e.into()),
      })
      .await?;

    match change {
      CatalogChange::Done => Ok(()),
      CatalogChange::InUse => Err(Error::CatalogInUse { vocabulary, key }),
      CatalogChange::Missing | CatalogChange::Taken => {
        Err(Error::CatalogNotFound { vocabulary, key })
      }
    }
  }

  async fn rename_catalog_key(
    &self,
    vocabulary: Vocabulary,
    old_key: String,
    new_key: String,
  ) -> Result<()> {
    Self::guard_sentinel(vocabulary, &old_key)?;
    let key_col = vocabulary.key_column();
    let sql = format!(
      "UPDATE {} SET {key_col} = ?1 WHERE {key_col} = ?2",
      vocabulary.table(),
    );

    let (old_arg, new_arg) = (old_key.clone(), new_key.clone());
    let change = self
      .conn
      .call(move |conn| {
        match conn.execute(&sql, rusqlite::params![new_arg, old_arg]) {
          Ok(0) => Ok(CatalogChange::Missing),
          Ok(_) => Ok(CatalogChange::Done),
          Err(e)
            if matches!(
              constraint_code(&e),
              Some(SQLITE_CONSTRAINT_PRIMARYKEY | SQLITE_CONSTRAINT_UNIQUE)
            ) =>
          {
            Ok(CatalogChange::Taken)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match change {
      CatalogChange::Done => Ok(()),
      CatalogChange::Taken => {
        Err(Error::CatalogKeyTaken { vocabulary, key: new_key })
      }
      CatalogChange::Missing | CatalogChange::InUse => {
        Err(Error::CatalogNotFound { vocabulary, key: old_key })
      }
    }
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn insert_taxpayer(&self, taxpayer: &Taxpayer) -> Result<InsertOutcome> {
    let ruc      = encode_ruc(taxpayer.ruc);
    let keys     = [
      taxpayer.activity.clone(),
      taxpayer.company_type.clone(),
      taxpayer.company_size.clone(),
      taxpayer.location.clone(),
      taxpayer.tax_status.clone(),
      taxpayer.domicile_condition.clone(),
    ];
    let sex      = encode_sex(taxpayer.sex);
    let age      = taxpayer.age.map(|a| i64::from(a.get()));
    let debt     = encode_debt(taxpayer.debt);

    let outcome = self
      .conn
      .call(move |conn| {
        let [activity, company_type, company_size, location, status, domicile] =
          keys;
        let result = conn.execute(
          &format!(
            "INSERT INTO contribuyente ({TAXPAYER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
          ),
          rusqlite::params![
            ruc,
            activity,
            company_type,
            company_size,
            location,
            status,
            domicile,
            sex,
            age,
            debt,
          ],
        );
        match result {
          Ok(_) => Ok(InsertOutcome::Inserted),
          Err(e) => match constraint_code(&e) {
            Some(SQLITE_CONSTRAINT_PRIMARYKEY | SQLITE_CONSTRAINT_UNIQUE) => {
              Ok(InsertOutcome::Duplicate)
            }
            Some(_) => Ok(InsertOutcome::ConstraintViolation(e.to_string())),
            None => Err(e.into()),
          },
        }
      })
      .await?;

    Ok(outcome)
  }

  async fn get_taxpayer(&self, ruc: Ruc) -> Result<Option<Taxpayer>> {
    let ruc = encode_ruc(ruc);

    let raw: Option<RawTaxpayer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TAXPAYER_COLUMNS} FROM contribuyente WHERE ruc = ?1"),
              rusqlite::params![ruc],
              RawTaxpayer::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTaxpayer::into_taxpayer).transpose()
  }

  async fn view_taxpayer(&self, ruc: Ruc) -> Result<Option<TaxpayerView>> {
    let ruc = encode_ruc(ruc);

    let raw: Option<RawTaxpayerView> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VIEW_COLUMNS} FROM v_contribuyente_detalle WHERE ruc = ?1"
              ),
              rusqlite::params![ruc],
              RawTaxpayerView::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTaxpayerView::into_view).transpose()
  }

  async fn list_taxpayers(&self, query: &TaxpayerQuery) -> Result<Vec<Taxpayer>> {
    let tax_status = query.tax_status.clone();
    let location   = query.location.clone();
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawTaxpayer> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically.
        let mut conds: Vec<&'static str> = vec![];
        if tax_status.is_some() {
          conds.push("id_estado = ?1");
        }
        if location.is_some() {
          conds.push("id_ubicacion = ?2");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {TAXPAYER_COLUMNS} FROM contribuyente
           {where_clause}
           ORDER BY ruc
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              tax_status.as_deref(),
              location.as_deref(),
              limit_val,
              offset_val,
            ],
            RawTaxpayer::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTaxpayer::into_taxpayer).collect()
  }

  async fn count_taxpayers(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM contribuyente", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n as u64)
  }

  // ── Reporting ─────────────────────────────────────────────────────────────

  async fn summary(&self, top_districts: usize) -> Result<Summary> {
    let limit = top_districts as i64;

    let raw = self
      .conn
      .call(move |conn| {
        let count = |sql: &str| -> rusqlite::Result<u64> {
          conn.query_row(sql, [], |r| r.get::<_, i64>(0)).map(|n| n as u64)
        };
        let grouped = |sql: &str, params: &[&dyn rusqlite::ToSql]| {
          let mut stmt = conn.prepare(sql)?;
          let rows = stmt
            .query_map(params, |r| {
              Ok(CategoryCount {
                key:         r.get(0)?,
                description: r.get(1)?,
                count:       r.get::<_, i64>(2)? as u64,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok::<_, rusqlite::Error>(rows)
        };

        let total = count("SELECT COUNT(*) FROM contribuyente")?;
        let active =
          count("SELECT COUNT(*) FROM contribuyente WHERE id_estado = 'ACTIVO'")?;

        let by_status = grouped(
          "SELECT et.id_estado, et.descripcion, COUNT(*) AS n
           FROM contribuyente c
           JOIN estado_tributario et ON et.id_estado = c.id_estado
           GROUP BY et.id_estado, et.descripcion
           ORDER BY n DESC, et.id_estado",
          rusqlite::params![],
        )?;

        let districts = grouped(
          "SELECT ug.id_ubicacion, ug.nombre_distrito, COUNT(*) AS n
           FROM contribuyente c
           JOIN ubicacion_geografica ug ON ug.id_ubicacion = c.id_ubicacion
           GROUP BY ug.id_ubicacion, ug.nombre_distrito
           ORDER BY n DESC, ug.id_ubicacion
           LIMIT ?1",
          rusqlite::params![limit],
        )?;

        // Debt is decimal text; aggregate it in Rust to keep exact cents.
        let debts = {
          let mut stmt = conn.prepare("SELECT deuda FROM contribuyente")?;
          stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let tables = TABLES
          .iter()
          .map(|t| {
            count(&format!("SELECT COUNT(*) FROM {t}"))
              .map(|rows| TableCount { table: (*t).to_owned(), rows })
          })
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, active, by_status, districts, debts, tables))
      })
      .await?;

    let (total, active, by_tax_status, top_districts, debts, table_counts) = raw;
    Ok(Summary {
      total_taxpayers: total,
      active_taxpayers: active,
      by_tax_status,
      debt: summarise_debt(&debts)?,
      top_districts,
      table_counts,
    })
  }

  async fn append_result(&self, result: NewAnalysisResult) -> Result<AnalysisResult> {
    let executed_at = Utc::now();
    let at_str      = encode_dt(executed_at);
    let row         = result.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO resultado_analisis
             (nombre_analisis, categoria, metrica, valor_numerico, valor_texto,
              fecha_ejecucion)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            row.analysis,
            row.category,
            row.metric,
            row.numeric_value,
            row.text_value,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(AnalysisResult {
      id,
      analysis: result.analysis,
      category: result.category,
      metric: result.metric,
      numeric_value: result.numeric_value,
      text_value: result.text_value,
      executed_at,
    })
  }

  async fn list_results(&self, analysis: Option<String>) -> Result<Vec<AnalysisResult>> {
    let raws: Vec<RawAnalysisResult> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {RESULT_COLUMNS} FROM resultado_analisis
           WHERE ?1 IS NULL OR nombre_analisis = ?1
           ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![analysis], RawAnalysisResult::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnalysisResult::into_result).collect()
  }
}

/// Debt figures over strictly positive debts.
fn summarise_debt(raw: &[String]) -> Result<DebtSummary> {
  let mut summary = DebtSummary::default();
  for s in raw {
    let debt = decode_debt(s)?;
    if debt <= Decimal::ZERO {
      continue;
    }
    summary.debtors += 1;
    summary.total = summary.total.checked_add(debt).ok_or(Error::DebtOverflow)?;
    summary.maximum = summary.maximum.max(debt);
  }
  if summary.debtors > 0 {
    summary.average = (summary.total / Decimal::from(summary.debtors)).round_dp(2);
  }
  Ok(summary)
}
