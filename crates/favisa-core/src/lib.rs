//! Core types and trait definitions for the FAVISA taxpayer pipeline.
//!
//! This crate owns the controlled vocabularies, the catalog registry, the
//! token normalizer and the fact loader. It has no HTTP or database
//! dependencies; storage backends implement [`store::TaxpayerStore`].

pub mod catalog;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod normalize;
pub mod repair;
pub mod report;
pub mod staging;
pub mod store;
pub mod taxpayer;
pub mod vocabulary;

pub use error::{Error, Result};
