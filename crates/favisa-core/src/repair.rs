//! Versioned corruption-repair tables.
//!
//! Repairs are data: an explicit list of `corrupted → canonical` pairs per
//! vocabulary, parsed from TOML. There is no fuzzy matching; a token that is
//! not listed is never repaired.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  taxpayer::Sex,
  vocabulary::Vocabulary,
};

/// The repair tables compiled into the crate.
pub const BUILTIN_REPAIRS: &str = include_str!("../data/repairs.toml");

/// Table name used for sex-token repairs in the TOML file.
pub const SEX_TABLE: &str = "sex";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRule {
  pub from: String,
  pub to:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairTable {
  pub version: u32,
  #[serde(default)]
  pub rules:   Vec<RepairRule>,
}

impl RepairTable {
  pub fn lookup(&self, token: &str) -> Option<&str> {
    self
      .rules
      .iter()
      .find(|r| r.from == token)
      .map(|r| r.to.as_str())
  }
}

/// All repair tables, validated against the vocabulary baselines.
#[derive(Debug, Clone, Default)]
pub struct RepairTables {
  vocabularies: BTreeMap<Vocabulary, RepairTable>,
  sex:          RepairTable,
}

impl RepairTables {
  pub fn builtin() -> Result<Self> { Self::from_toml(BUILTIN_REPAIRS) }

  /// Parse and validate a repair file.
  ///
  /// Every `to` must be a baseline key of its vocabulary (or a sex token),
  /// every `from` must be unique within its table, and no `from` may equal a
  /// baseline key, since an exact match would always win over it.
  pub fn from_toml(source: &str) -> Result<Self> {
    let raw: BTreeMap<String, RepairTable> = toml::from_str(source)?;
    let mut tables = Self::default();

    for (name, mut table) in raw {
      for rule in &mut table.rules {
        rule.from = canonical_token(&rule.from);
        rule.to = canonical_token(&rule.to);
      }
      check_unique_sources(&name, &table)?;

      if name == SEX_TABLE {
        for rule in &table.rules {
          if rule.to.parse::<Sex>().is_err() {
            return Err(invalid(&name, format!("{:?} is not a sex token", rule.to)));
          }
          if rule.from.parse::<Sex>().is_ok() {
            return Err(invalid(&name, format!("{:?} shadows a sex token", rule.from)));
          }
        }
        tables.sex = table;
        continue;
      }

      let vocabulary: Vocabulary = name
        .parse()
        .map_err(|_| Error::UnknownRepairTable(name.clone()))?;
      let baseline = vocabulary.baseline();
      for rule in &table.rules {
        if !baseline.iter().any(|e| e.key == rule.to) {
          return Err(invalid(
            &name,
            format!("target {:?} is not a baseline key", rule.to),
          ));
        }
        if baseline.iter().any(|e| e.key == rule.from) {
          return Err(invalid(
            &name,
            format!("source {:?} shadows a baseline key", rule.from),
          ));
        }
      }
      tables.vocabularies.insert(vocabulary, table);
    }

    Ok(tables)
  }

  /// The repair table for `vocabulary`; empty if the file had none.
  pub fn vocabulary(&self, vocabulary: Vocabulary) -> Option<&RepairTable> {
    self.vocabularies.get(&vocabulary)
  }

  pub fn sex(&self) -> &RepairTable { &self.sex }

  /// `(table, version)` pairs, for stamping into a load manifest.
  pub fn versions(&self) -> BTreeMap<String, u32> {
    self
      .vocabularies
      .iter()
      .map(|(v, t)| (v.to_string(), t.version))
      .chain(std::iter::once((SEX_TABLE.to_owned(), self.sex.version)))
      .collect()
  }
}

/// Trim and upper-case a raw token; the form all comparisons use.
pub fn canonical_token(raw: &str) -> String { raw.trim().to_uppercase() }

fn check_unique_sources(name: &str, table: &RepairTable) -> Result<()> {
  let mut seen = std::collections::BTreeSet::new();
  for rule in &table.rules {
    if !seen.insert(rule.from.as_str()) {
      return Err(invalid(name, format!("duplicate source {:?}", rule.from)));
    }
  }
  Ok(())
}

fn invalid(table: &str, detail: String) -> Error {
  Error::InvalidRepairRule { table: table.to_owned(), detail }
}
