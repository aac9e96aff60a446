//! SQLite backend for the FAVISA taxpayer store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The schema is the constraint layer:
//! primary keys, foreign keys and check constraints make an invalid fact
//! unrepresentable even if the loader is bypassed.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
