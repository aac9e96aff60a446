//! Catalog entries and the in-memory [`CatalogRegistry`].
//!
//! The registry is the single source of truth for which keys are valid
//! during a load run. It is owned by the caller and passed into the loader;
//! nothing here is global.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{Error, Result, vocabulary::Vocabulary};

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Vocabulary-specific columns carried alongside key and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryMetadata {
  Activity {
    seccion:  Option<String>,
    division: Option<String>,
  },
  CompanyType {
    abreviatura: Option<String>,
  },
  CompanySize {
    criterio_ventas: Option<String>,
  },
  /// The entry description is the district name.
  Location {
    provincia:     Option<String>,
    departamento:  Option<String>,
    ubigeo_codigo: Option<String>,
  },
  /// Tax status and domicile condition carry nothing beyond a description.
  Plain,
}

impl EntryMetadata {
  /// Whether this metadata shape belongs to `vocabulary`.
  pub fn fits(&self, vocabulary: Vocabulary) -> bool {
    matches!(
      (self, vocabulary),
      (Self::Activity { .. }, Vocabulary::Activity)
        | (Self::CompanyType { .. }, Vocabulary::CompanyType)
        | (Self::CompanySize { .. }, Vocabulary::CompanySize)
        | (Self::Location { .. }, Vocabulary::Location)
        | (Self::Plain, Vocabulary::TaxStatus | Vocabulary::DomicileCondition)
    )
  }
}

/// One member of a controlled vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
  pub key:         String,
  pub description: String,
  pub metadata:    EntryMetadata,
}

impl CatalogEntry {
  pub fn new(
    key: impl Into<String>,
    description: impl Into<String>,
    metadata: EntryMetadata,
  ) -> Self {
    Self { key: key.into(), description: description.into(), metadata }
  }

  /// True if this entry still carries the description the loader gives to
  /// keys it discovers in source data.
  pub fn is_placeholder(&self, vocabulary: Vocabulary) -> bool {
    vocabulary
      .placeholder(&self.key)
      .is_some_and(|p| p.description == self.description)
  }
}

/// The effect of a successful [`CatalogRegistry::register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
  /// The key was new and has been added.
  Inserted,
  /// The key already existed with the same description; nothing changed.
  Unchanged,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Six keyed catalogs, one per [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct CatalogRegistry {
  catalogs: BTreeMap<Vocabulary, BTreeMap<String, CatalogEntry>>,
}

impl CatalogRegistry {
  /// A registry where every vocabulary holds only its baseline entries.
  pub fn with_baseline() -> Self {
    let catalogs = Vocabulary::iter()
      .map(|v| {
        let entries =
          v.baseline().into_iter().map(|e| (e.key.clone(), e)).collect();
        (v, entries)
      })
      .collect();
    Self { catalogs }
  }

  pub fn lookup(&self, vocabulary: Vocabulary, key: &str) -> Result<&CatalogEntry> {
    self
      .catalog(vocabulary)
      .get(key)
      .ok_or_else(|| Error::CatalogNotFound { vocabulary, key: key.to_owned() })
  }

  pub fn contains(&self, vocabulary: Vocabulary, key: &str) -> bool {
    self.catalog(vocabulary).contains_key(key)
  }

  /// Add `entry` to `vocabulary`.
  ///
  /// Registering an identical key and description again is a no-op. A
  /// different description for an existing key is a
  /// [`Error::CatalogConflict`]; the existing entry is never overwritten.
  pub fn register(
    &mut self,
    vocabulary: Vocabulary,
    entry: CatalogEntry,
  ) -> Result<Registration> {
    if !entry.metadata.fits(vocabulary) {
      return Err(Error::MetadataMismatch { vocabulary, key: entry.key });
    }

    let catalog = self.catalogs.entry(vocabulary).or_default();
    match catalog.get(&entry.key) {
      Some(existing) if existing.description == entry.description => {
        Ok(Registration::Unchanged)
      }
      Some(existing) => Err(Error::CatalogConflict {
        vocabulary,
        key: entry.key.clone(),
        existing: existing.description.clone(),
        incoming: entry.description,
      }),
      None => {
        catalog.insert(entry.key.clone(), entry);
        Ok(Registration::Inserted)
      }
    }
  }

  /// Drop `key` from `vocabulary`. Sentinels stay.
  pub fn forget(&mut self, vocabulary: Vocabulary, key: &str) -> Option<CatalogEntry> {
    if key == vocabulary.sentinel() {
      return None;
    }
    self.catalogs.get_mut(&vocabulary)?.remove(key)
  }

  pub fn sentinel(&self, vocabulary: Vocabulary) -> &'static str {
    vocabulary.sentinel()
  }

  /// Entries of one vocabulary in key order.
  pub fn entries(
    &self,
    vocabulary: Vocabulary,
  ) -> impl Iterator<Item = &CatalogEntry> + '_ {
    self.catalog(vocabulary).values()
  }

  pub fn len(&self, vocabulary: Vocabulary) -> usize {
    self.catalog(vocabulary).len()
  }

  fn catalog(&self, vocabulary: Vocabulary) -> &BTreeMap<String, CatalogEntry> {
    static EMPTY: BTreeMap<String, CatalogEntry> = BTreeMap::new();
    self.catalogs.get(&vocabulary).unwrap_or(&EMPTY)
  }
}

impl Default for CatalogRegistry {
  fn default() -> Self { Self::with_baseline() }
}
