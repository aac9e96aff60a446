//! The fact loader: staged rows in, normalised facts and a manifest out.
//!
//! One loader instance handles one batch sequentially. The catalog registry
//! is borrowed from the caller for the duration of the run, so two runs (or
//! two tests) never share catalog state by accident.
//!
//! Per row:
//!
//! 1. `ruc` must parse as a positive integer at or above `min_ruc`
//! 2. each categorical column is normalised against its vocabulary
//! 3. `age` and `debt` are range-checked, `sex` is normalised
//! 4. a RUC that is already loaded is rejected, never overwritten
//! 5. newly discovered descriptive keys are registered (registry, then store)
//! 6. the fact is inserted; if the store refuses it, the keys from step 5
//!    are removed again
//!
//! Rejections are recorded and logged individually; only a store failure or
//! a constraint violation stops the batch.

use std::{fmt::Display, str::FromStr as _};

use chrono::Utc;
use rust_decimal::{Decimal, prelude::ToPrimitive as _};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use thiserror::Error;

use crate::{
  catalog::{CatalogRegistry, Registration},
  manifest::{LoadManifest, RejectReason, Rejection},
  normalize::{Normalized, Normalizer, Resolution},
  staging::StagedRow,
  store::{CatalogWrite, InsertOutcome, TaxpayerStore},
  taxpayer::{Age, Ruc, Sex, Taxpayer},
  vocabulary::Vocabulary,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tunables for one load run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
  /// Identifiers below this value are rejected as invalid.
  pub min_ruc:                u64,
  /// Maximum number of rejections kept verbatim in the manifest.
  pub rejection_sample_limit: usize,
  /// Log progress every this many accepted rows; `0` disables it.
  pub progress_every:         u64,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self { min_ruc: 1, rejection_sample_limit: 1000, progress_every: 10_000 }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failure that stops the batch.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("catalog error: {0}")]
  Catalog(#[from] crate::Error),

  /// The store refused a row the loader had validated. This means the
  /// loader and the schema disagree, so ingestion stops here.
  #[error("constraint violation for ruc {ruc}: {message}")]
  ConstraintViolation {
    ruc:      Ruc,
    message:  String,
    /// Everything recorded up to and including the offending row.
    manifest: Box<LoadManifest>,
  },
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> LoadError {
  LoadError::Store(Box::new(e))
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

/// Build the registry for a load run against `store`.
///
/// Starts from the baselines, absorbs every entry already persisted (keys
/// registered by earlier runs included), then inserts whatever baseline
/// entries the store lacks. A stored description that disagrees with the
/// baseline is a [`crate::Error::CatalogConflict`].
pub async fn bootstrap<S: TaxpayerStore>(store: &S) -> Result<CatalogRegistry, LoadError> {
  let mut registry = CatalogRegistry::with_baseline();

  for vocabulary in Vocabulary::iter() {
    let stored = store.list_catalog(vocabulary).await.map_err(store_err)?;
    let known = stored.len();
    for entry in stored {
      registry.register(vocabulary, entry)?;
    }

    let mut seeded = 0usize;
    for entry in vocabulary.baseline() {
      if let CatalogWrite::Inserted = store
        .ensure_catalog_entry(vocabulary, entry)
        .await
        .map_err(store_err)?
      {
        seeded += 1;
      }
    }

    tracing::info!(
      %vocabulary,
      stored = known,
      seeded,
      total = registry.len(vocabulary),
      "catalog ready"
    );
  }

  Ok(registry)
}

// ─── Row preparation ─────────────────────────────────────────────────────────

/// A staged row that passed every check not requiring the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRow {
  pub ruc:         Ruc,
  /// One entry per vocabulary, in [`Vocabulary::iter`] order.
  pub categorical: Vec<(Vocabulary, Normalized)>,
  pub sex:         (Sex, Resolution),
  pub age:         Option<Age>,
  pub debt:        Decimal,
}

impl PreparedRow {
  pub fn to_taxpayer(&self) -> Taxpayer {
    let key = |v: Vocabulary| {
      self
        .categorical
        .iter()
        .find(|(cv, _)| *cv == v)
        .map(|(_, n)| n.key.clone())
        .unwrap_or_else(|| v.sentinel().to_owned())
    };
    Taxpayer {
      ruc:                self.ruc,
      activity:           key(Vocabulary::Activity),
      company_type:       key(Vocabulary::CompanyType),
      company_size:       key(Vocabulary::CompanySize),
      location:           key(Vocabulary::Location),
      tax_status:         key(Vocabulary::TaxStatus),
      domicile_condition: key(Vocabulary::DomicileCondition),
      sex:                self.sex.0,
      age:                self.age,
      debt:               self.debt,
    }
  }
}

/// Validate and normalise one row without touching the store.
pub fn prepare_row(
  normalizer: &Normalizer,
  registry: &CatalogRegistry,
  config: &LoaderConfig,
  row: &StagedRow,
) -> Result<PreparedRow, (RejectReason, String)> {
  let ruc = parse_ruc(row.ruc.as_deref(), config.min_ruc)
    .map_err(|detail| (RejectReason::InvalidIdentifier, detail))?;

  let categorical = Vocabulary::iter()
    .map(|v| (v, normalizer.normalize(registry, v, row.token(v))))
    .collect();

  let sex = normalizer.normalize_sex(row.sex.as_deref());
  let age = parse_age(row.age.as_deref())
    .map_err(|detail| (RejectReason::InvalidAge, detail))?;
  let debt = parse_debt(row.debt.as_deref())
    .map_err(|detail| (RejectReason::InvalidDebt, detail))?;

  Ok(PreparedRow { ruc, categorical, sex, age, debt })
}

fn parse_ruc(raw: Option<&str>, min_ruc: u64) -> Result<Ruc, String> {
  let raw = raw.ok_or_else(|| "ruc is missing".to_owned())?;
  let ruc: Ruc = raw.parse()?;
  if ruc.get() < min_ruc {
    return Err(format!("ruc {ruc} is below the minimum {min_ruc}"));
  }
  Ok(ruc)
}

/// Ages may be written as `35` or `35.0`; anything fractional, negative or
/// above the maximum is rejected.
fn parse_age(raw: Option<&str>) -> Result<Option<Age>, String> {
  let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(None);
  };
  let value =
    Decimal::from_str(raw).map_err(|_| format!("age {raw:?} is not a number"))?;
  if !value.fract().is_zero() {
    return Err(format!("age {raw:?} is not a whole number"));
  }
  value
    .to_u8()
    .and_then(Age::new)
    .map(Some)
    .ok_or_else(|| format!("age {raw} is outside 0..={}", Age::MAX))
}

/// An empty debt is zero; anything else must be a non-negative decimal.
fn parse_debt(raw: Option<&str>) -> Result<Decimal, String> {
  let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(Decimal::ZERO);
  };
  let value = Decimal::from_str(raw)
    .or_else(|_| Decimal::from_scientific(raw))
    .map_err(|_| format!("debt {raw:?} is not a decimal"))?;
  match (value.is_sign_negative(), value.is_zero()) {
    (true, true) => Ok(Decimal::ZERO),
    (true, false) => Err(format!("debt {raw} is negative")),
    _ => Ok(value),
  }
}

// ─── Loader ──────────────────────────────────────────────────────────────────

/// What happened to one staged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
  Accepted(Ruc),
  Rejected(RejectReason),
}

/// Loads one batch of staged rows into `S`.
pub struct FactLoader<'a, S: TaxpayerStore> {
  store:      &'a S,
  registry:   &'a mut CatalogRegistry,
  normalizer: &'a Normalizer,
  config:     LoaderConfig,
  manifest:   LoadManifest,
}

impl<'a, S: TaxpayerStore> FactLoader<'a, S> {
  pub fn new(
    store: &'a S,
    registry: &'a mut CatalogRegistry,
    normalizer: &'a Normalizer,
    config: LoaderConfig,
  ) -> Self {
    let manifest = LoadManifest {
      started_at: Some(Utc::now()),
      repair_versions: normalizer.repairs().versions(),
      ..LoadManifest::default()
    };
    Self { store, registry, normalizer, config, manifest }
  }

  pub fn manifest(&self) -> &LoadManifest { &self.manifest }

  /// Load every row of `rows`. Items that failed to decode upstream are
  /// recorded as [`RejectReason::MalformedRow`].
  pub async fn load_all<I, E>(mut self, rows: I) -> Result<LoadManifest, LoadError>
  where
    I: IntoIterator<Item = Result<StagedRow, E>>,
    E: Display,
  {
    for item in rows {
      match item {
        Ok(row) => {
          self.load_row(row).await?;
        }
        Err(e) => self.record_malformed(e.to_string()),
      }
    }
    Ok(self.finish())
  }

  /// Record a source record that could not be decoded into a [`StagedRow`].
  pub fn record_malformed(&mut self, detail: String) {
    self.manifest.processed += 1;
    self.reject(None, RejectReason::MalformedRow, detail, None);
  }

  pub async fn load_row(&mut self, row: StagedRow) -> Result<RowOutcome, LoadError> {
    self.manifest.processed += 1;

    let prepared =
      match prepare_row(self.normalizer, self.registry, &self.config, &row) {
        Ok(p) => p,
        Err((reason, detail)) => {
          self.reject(row.line, reason, detail, Some(row));
          return Ok(RowOutcome::Rejected(reason));
        }
      };

    if self
      .store
      .get_taxpayer(prepared.ruc)
      .await
      .map_err(store_err)?
      .is_some()
    {
      return Ok(self.reject_duplicate(&prepared, row));
    }

    let mut discovered = Vec::new();
    for (vocabulary, normalized) in &prepared.categorical {
      if normalized.resolution == Resolution::New
        && self.register_discovered(*vocabulary, &normalized.key).await?
      {
        discovered.push((*vocabulary, normalized.key.clone()));
      }
    }

    let taxpayer = prepared.to_taxpayer();
    let outcome = self
      .store
      .insert_taxpayer(&taxpayer)
      .await
      .map_err(store_err)?;

    match outcome {
      InsertOutcome::Inserted => {
        for (vocabulary, _) in &discovered {
          *self
            .manifest
            .registered
            .entry(vocabulary.to_string())
            .or_default() += 1;
        }
        self.accept(&prepared);
        Ok(RowOutcome::Accepted(prepared.ruc))
      }
      InsertOutcome::Duplicate => {
        self.retract(discovered).await?;
        Ok(self.reject_duplicate(&prepared, row))
      }
      InsertOutcome::ConstraintViolation(message) => {
        self.retract(discovered).await?;
        tracing::error!(
          ruc = %prepared.ruc,
          line = ?row.line,
          %message,
          "store rejected a validated row; halting"
        );
        self.reject(
          row.line,
          RejectReason::ConstraintViolation,
          message.clone(),
          Some(row),
        );
        self.manifest.finished_at = Some(Utc::now());
        Err(LoadError::ConstraintViolation {
          ruc: prepared.ruc,
          message,
          manifest: Box::new(std::mem::take(&mut self.manifest)),
        })
      }
    }
  }

  /// Close the run and hand back the manifest.
  pub fn finish(mut self) -> LoadManifest {
    self.manifest.finished_at = Some(Utc::now());
    tracing::info!(
      processed = self.manifest.processed,
      accepted = self.manifest.accepted,
      rejected = self.manifest.rejected,
      "load finished"
    );
    self.manifest
  }

  // ── Internals ─────────────────────────────────────────────────────────

  fn accept(&mut self, prepared: &PreparedRow) {
    self.manifest.accepted += 1;
    for (vocabulary, normalized) in &prepared.categorical {
      if let Resolution::Unresolved { raw } = &normalized.resolution {
        tracing::debug!(%vocabulary, raw, key = %normalized.key, "mapped to sentinel");
      }
      self
        .manifest
        .record_resolution(vocabulary.as_ref(), &normalized.resolution);
    }
    self.manifest.record_resolution("sex", &prepared.sex.1);

    let every = self.config.progress_every;
    if every > 0 && self.manifest.accepted % every == 0 {
      tracing::info!(accepted = self.manifest.accepted, "loading");
    }
  }

  fn reject_duplicate(&mut self, prepared: &PreparedRow, row: StagedRow) -> RowOutcome {
    let reason = RejectReason::DuplicateIdentifier;
    let detail = format!("ruc {} already loaded", prepared.ruc);
    self.reject(row.line, reason, detail, Some(row));
    RowOutcome::Rejected(reason)
  }

  fn reject(
    &mut self,
    line: Option<u64>,
    reason: RejectReason,
    detail: String,
    raw: Option<StagedRow>,
  ) {
    tracing::warn!(?line, %reason, %detail, "row rejected");
    self.manifest.record_rejection(
      Rejection { line, reason, detail, raw },
      self.config.rejection_sample_limit,
    );
  }

  /// Register a key discovered in the source data, first in the registry
  /// and then in the store, before any fact references it. Returns whether
  /// the store gained a new entry.
  async fn register_discovered(
    &mut self,
    vocabulary: Vocabulary,
    key: &str,
  ) -> Result<bool, LoadError> {
    let Some(entry) = vocabulary.placeholder(key) else {
      return Ok(false);
    };

    match self.registry.register(vocabulary, entry.clone()) {
      Ok(Registration::Inserted) => {}
      Ok(Registration::Unchanged) => return Ok(false),
      Err(crate::Error::CatalogConflict { existing, .. }) => {
        self.warn_conflict(vocabulary, key, &existing);
        return Ok(false);
      }
      Err(e) => return Err(e.into()),
    }

    match self
      .store
      .ensure_catalog_entry(vocabulary, entry)
      .await
      .map_err(store_err)?
    {
      CatalogWrite::Inserted => {
        tracing::debug!(%vocabulary, key, "registered new catalog key");
        Ok(true)
      }
      CatalogWrite::Existing(stored) if stored.is_placeholder(vocabulary) => {
        Ok(false)
      }
      CatalogWrite::Existing(stored) => {
        self.warn_conflict(vocabulary, key, &stored.description);
        Ok(false)
      }
    }
  }

  /// Undo the registrations of a row the store refused. No fact can
  /// reference these keys yet.
  async fn retract(
    &mut self,
    discovered: Vec<(Vocabulary, String)>,
  ) -> Result<(), LoadError> {
    for (vocabulary, key) in discovered {
      self.registry.forget(vocabulary, &key);
      self
        .store
        .remove_catalog_entry(vocabulary, key.clone())
        .await
        .map_err(store_err)?;
      tracing::debug!(%vocabulary, key, "retracted catalog key");
    }
    Ok(())
  }

  fn warn_conflict(&mut self, vocabulary: Vocabulary, key: &str, existing: &str) {
    tracing::warn!(
      %vocabulary,
      key,
      existing,
      "catalog key already curated; keeping stored description"
    );
    self.manifest.warnings.push(format!(
      "{vocabulary} key {key:?} kept its curated description {existing:?}"
    ));
  }
}
