//! Handlers for `/taxpayers` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use favisa_core::{
  store::{TaxpayerQuery, TaxpayerStore},
  taxpayer::{Ruc, Taxpayer, TaxpayerView},
};

use crate::error::ApiError;

/// Page size when the caller gives none.
const DEFAULT_LIMIT: usize = 100;

/// `GET /taxpayers[?tax_status=&location=&limit=&offset=]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(mut query): Query<TaxpayerQuery>,
) -> Result<Json<Vec<Taxpayer>>, ApiError>
where
  S: TaxpayerStore,
{
  query.limit.get_or_insert(DEFAULT_LIMIT);
  let taxpayers = store
    .list_taxpayers(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(taxpayers))
}

/// `GET /taxpayers/{ruc}`: the joined view, descriptions included.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
) -> Result<Json<TaxpayerView>, ApiError>
where
  S: TaxpayerStore,
{
  let ruc: Ruc = raw.parse().map_err(ApiError::BadRequest)?;
  store
    .view_taxpayer(ruc)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("taxpayer {ruc}")))
}
