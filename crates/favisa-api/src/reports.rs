//! Handlers for the dashboard's aggregate reads.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use favisa_core::{
  report::{AnalysisResult, Summary},
  store::TaxpayerStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  /// How many districts to rank.
  #[serde(default = "default_top")]
  pub top: usize,
}

fn default_top() -> usize { 5 }

/// `GET /summary[?top=<n>]`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<Summary>, ApiError>
where
  S: TaxpayerStore,
{
  let summary = store.summary(params.top).await.map_err(ApiError::store)?;
  Ok(Json(summary))
}

// ─── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResultParams {
  pub analysis: Option<String>,
}

/// `GET /results[?analysis=<name>]`
pub async fn results<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ResultParams>,
) -> Result<Json<Vec<AnalysisResult>>, ApiError>
where
  S: TaxpayerStore,
{
  let results = store
    .list_results(params.analysis)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(results))
}
