//! The token normalizer: raw source token → valid catalog key.
//!
//! Resolution order for one token in one vocabulary:
//!
//! 1. empty → sentinel ([`Resolution::Missing`])
//! 2. exact match against the registry, after trim + upper-case
//! 3. listed repair from the vocabulary's [`RepairTable`]
//! 4. auto-registering vocabularies: the token itself, as a new key
//! 5. otherwise → sentinel ([`Resolution::Unresolved`])
//!
//! The returned key depends only on the token and the repair tables: a token
//! first seen as [`Resolution::New`] is registered under its own text, so
//! later occurrences resolve to the same key.

use serde::{Deserialize, Serialize};

use crate::{
  catalog::CatalogRegistry,
  repair::{RepairTable, RepairTables, canonical_token},
  taxpayer::Sex,
  vocabulary::{RegistrationPolicy, Vocabulary},
};

/// How a token reached its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
  /// The token already was a valid key.
  Exact,
  /// A listed repair rule rewrote the token.
  Repaired { from: String },
  /// The token is unknown; the key must be registered before use.
  New,
  /// The source field was empty; mapped to the sentinel.
  Missing,
  /// The token is unknown to a strict vocabulary; mapped to the sentinel.
  Unresolved { raw: String },
}

/// A normalised token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
  pub key:        String,
  pub resolution: Resolution,
}

impl Normalized {
  fn sentinel(vocabulary: Vocabulary, resolution: Resolution) -> Self {
    Self { key: vocabulary.sentinel().to_owned(), resolution }
  }
}

/// Applies the exact / repair / sentinel rules for every vocabulary.
#[derive(Debug, Clone)]
pub struct Normalizer {
  repairs: RepairTables,
}

impl Normalizer {
  pub fn new(repairs: RepairTables) -> Self { Self { repairs } }

  /// A normalizer using the repair tables shipped with the crate.
  pub fn builtin() -> crate::Result<Self> { Ok(Self::new(RepairTables::builtin()?)) }

  pub fn repairs(&self) -> &RepairTables { &self.repairs }

  pub fn normalize(
    &self,
    registry: &CatalogRegistry,
    vocabulary: Vocabulary,
    raw: Option<&str>,
  ) -> Normalized {
    let token = raw.map(canonical_token).unwrap_or_default();
    if token.is_empty() {
      return Normalized::sentinel(vocabulary, Resolution::Missing);
    }

    if registry.contains(vocabulary, &token) {
      return Normalized { key: token, resolution: Resolution::Exact };
    }

    if let Some(key) = self
      .repairs
      .vocabulary(vocabulary)
      .and_then(|t| t.lookup(&token))
      .filter(|key| registry.contains(vocabulary, key))
    {
      return Normalized {
        key:        key.to_owned(),
        resolution: Resolution::Repaired { from: token },
      };
    }

    match vocabulary.policy() {
      RegistrationPolicy::AutoRegister => {
        Normalized { key: token, resolution: Resolution::New }
      }
      RegistrationPolicy::Strict => {
        Normalized::sentinel(vocabulary, Resolution::Unresolved { raw: token })
      }
    }
  }

  /// Sex tokens follow the same exact / repair / sentinel strategy, with
  /// [`Sex::Undetermined`] as the sentinel.
  pub fn normalize_sex(&self, raw: Option<&str>) -> (Sex, Resolution) {
    let token = raw.map(canonical_token).unwrap_or_default();
    if token.is_empty() {
      return (Sex::Undetermined, Resolution::Missing);
    }
    if let Ok(sex) = token.parse::<Sex>() {
      return (sex, Resolution::Exact);
    }
    match repair_sex(self.repairs.sex(), &token) {
      Some(sex) => (sex, Resolution::Repaired { from: token }),
      None => (Sex::Undetermined, Resolution::Unresolved { raw: token }),
    }
  }
}

fn repair_sex(table: &RepairTable, token: &str) -> Option<Sex> {
  table.lookup(token).and_then(|to| to.parse().ok())
}
