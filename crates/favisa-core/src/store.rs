//! The `TaxpayerStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `favisa-store-sqlite`),
//! which act as the constraint layer: whatever the loader does, the backend
//! must make an invalid fact unrepresentable. Higher layers (`favisa-api`,
//! `favisa-cli`, the loader) depend on this abstraction only.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  catalog::CatalogEntry,
  report::{AnalysisResult, NewAnalysisResult, Summary},
  taxpayer::{Ruc, Taxpayer, TaxpayerView},
  vocabulary::Vocabulary,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of [`TaxpayerStore::ensure_catalog_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWrite {
  Inserted,
  /// The key was already present; the stored entry is returned untouched.
  Existing(CatalogEntry),
}

/// Result of [`TaxpayerStore::insert_taxpayer`]. Uniqueness and constraint
/// failures are outcomes, not errors, so the loader can count them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted,
  /// A fact with this RUC already exists; the stored row is unchanged.
  Duplicate,
  /// A foreign-key or check constraint refused the row.
  ConstraintViolation(String),
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`TaxpayerStore::list_taxpayers`]. Results are ordered by
/// RUC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxpayerQuery {
  pub tax_status: Option<String>,
  pub location:   Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a durable taxpayer store.
///
/// Facts are insert-only: there is no update path, and a second insert for
/// the same RUC reports [`InsertOutcome::Duplicate`].
pub trait TaxpayerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Catalogs ──────────────────────────────────────────────────────────

  /// Insert `entry` unless its key already exists.
  fn ensure_catalog_entry(
    &self,
    vocabulary: Vocabulary,
    entry: CatalogEntry,
  ) -> impl Future<Output = Result<CatalogWrite, Self::Error>> + Send + '_;

  fn get_catalog_entry(
    &self,
    vocabulary: Vocabulary,
    key: String,
  ) -> impl Future<Output = Result<Option<CatalogEntry>, Self::Error>> + Send + '_;

  /// All entries of one vocabulary, ordered by key.
  fn list_catalog(
    &self,
    vocabulary: Vocabulary,
  ) -> impl Future<Output = Result<Vec<CatalogEntry>, Self::Error>> + Send + '_;

  /// Delete a catalog entry. Fails while any fact references it.
  fn remove_catalog_entry(
    &self,
    vocabulary: Vocabulary,
    key: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Change a catalog key; referencing facts follow the new key.
  fn rename_catalog_key(
    &self,
    vocabulary: Vocabulary,
    old_key: String,
    new_key: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Facts ─────────────────────────────────────────────────────────────

  fn insert_taxpayer<'a>(
    &'a self,
    taxpayer: &'a Taxpayer,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  fn get_taxpayer(
    &self,
    ruc: Ruc,
  ) -> impl Future<Output = Result<Option<Taxpayer>, Self::Error>> + Send + '_;

  /// The denormalised view row for one taxpayer.
  fn view_taxpayer(
    &self,
    ruc: Ruc,
  ) -> impl Future<Output = Result<Option<TaxpayerView>, Self::Error>> + Send + '_;

  fn list_taxpayers<'a>(
    &'a self,
    query: &'a TaxpayerQuery,
  ) -> impl Future<Output = Result<Vec<Taxpayer>, Self::Error>> + Send + 'a;

  fn count_taxpayers(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reporting ─────────────────────────────────────────────────────────

  fn summary(
    &self,
    top_districts: usize,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + '_;

  /// Append one row to the analysis-results sink.
  fn append_result(
    &self,
    result: NewAnalysisResult,
  ) -> impl Future<Output = Result<AnalysisResult, Self::Error>> + Send + '_;

  /// Results in insertion order, optionally for one analysis only.
  fn list_results(
    &self,
    analysis: Option<String>,
  ) -> impl Future<Output = Result<Vec<AnalysisResult>, Self::Error>> + Send + '_;
}
