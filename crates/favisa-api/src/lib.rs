//! Read-only JSON API over the taxpayer store, for the external dashboard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`favisa_core::store::TaxpayerStore`]. Nothing here writes: loading goes
//! through the CLI, and analysis results are appended by the analytics jobs.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", favisa_api::api_router(store.clone()))
//! ```

pub mod catalogs;
pub mod error;
pub mod reports;
pub mod taxpayers;

use std::sync::Arc;

use axum::{Router, routing::get};
use favisa_core::store::TaxpayerStore;

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TaxpayerStore + 'static,
{
  Router::new()
    // Catalogs
    .route("/catalogs/{vocabulary}", get(catalogs::list::<S>))
    .route("/catalogs/{vocabulary}/{key}", get(catalogs::get_one::<S>))
    // Facts
    .route("/taxpayers", get(taxpayers::list::<S>))
    .route("/taxpayers/{ruc}", get(taxpayers::get_one::<S>))
    // Reporting
    .route("/summary", get(reports::summary::<S>))
    .route("/results", get(reports::results::<S>))
    .with_state(store)
}
