//! Handlers for `/catalogs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalogs/{vocabulary}` | e.g. `tax_status`, `location` |
//! | `GET`  | `/catalogs/{vocabulary}/{key}` | 404 if the key is unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use favisa_core::{
  catalog::CatalogEntry, store::TaxpayerStore, vocabulary::Vocabulary,
};

use crate::error::ApiError;

fn vocabulary(raw: &str) -> Result<Vocabulary, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("unknown vocabulary: {raw}")))
}

/// `GET /catalogs/{vocabulary}`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(raw): Path<String>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError>
where
  S: TaxpayerStore,
{
  let vocabulary = vocabulary(&raw)?;
  let entries = store
    .list_catalog(vocabulary)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `GET /catalogs/{vocabulary}/{key}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((raw, key)): Path<(String, String)>,
) -> Result<Json<CatalogEntry>, ApiError>
where
  S: TaxpayerStore,
{
  let vocabulary = vocabulary(&raw)?;
  store
    .get_catalog_entry(vocabulary, key.clone())
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("{vocabulary} {key}")))
}
