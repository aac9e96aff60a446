//! Read-side report types: the executive summary and the analysis-results
//! sink written by external analytics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Summary ─────────────────────────────────────────────────────────────────

/// A catalog key with its description and the number of taxpayers holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
  pub key:         String,
  pub description: String,
  pub count:       u64,
}

/// Debt figures over taxpayers whose debt is strictly positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSummary {
  pub debtors: u64,
  pub total:   Decimal,
  pub average: Decimal,
  pub maximum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
  pub table: String,
  pub rows:  u64,
}

/// The executive overview shown after a load and on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total_taxpayers:  u64,
  pub active_taxpayers: u64,
  /// Descending by count.
  pub by_tax_status:    Vec<CategoryCount>,
  pub debt:             DebtSummary,
  /// Descending by count, at most the requested number of districts.
  pub top_districts:    Vec<CategoryCount>,
  pub table_counts:     Vec<TableCount>,
}

// ─── Analysis results sink ───────────────────────────────────────────────────

/// Input to [`crate::store::TaxpayerStore::append_result`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnalysisResult {
  pub analysis:      String,
  pub category:      Option<String>,
  pub metric:        Option<String>,
  pub numeric_value: Option<f64>,
  pub text_value:    Option<String>,
}

/// One appended analysis result. Rows are never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
  pub id:            i64,
  pub analysis:      String,
  pub category:      Option<String>,
  pub metric:        Option<String>,
  pub numeric_value: Option<f64>,
  pub text_value:    Option<String>,
  /// Store-assigned.
  pub executed_at:   DateTime<Utc>,
}
