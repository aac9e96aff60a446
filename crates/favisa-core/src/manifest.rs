//! The load manifest: what a load run accepted, rejected and repaired.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{normalize::Resolution, staging::StagedRow};

/// Why a staged row did not become a fact.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
  /// The source record could not be decoded at all.
  MalformedRow,
  /// `ruc` absent, non-numeric or not positive.
  InvalidIdentifier,
  /// A fact with the same `ruc` was already stored.
  DuplicateIdentifier,
  /// Age present but not an integer within `0..=120`.
  InvalidAge,
  /// Debt not a decimal, or negative.
  InvalidDebt,
  /// The store refused a row the loader considered valid.
  ConstraintViolation,
}

/// One rejected row, kept for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
  pub line:   Option<u64>,
  pub reason: RejectReason,
  pub detail: String,
  /// The original row; absent when the record could not be decoded.
  pub raw:    Option<StagedRow>,
}

/// Counts and samples for one load run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadManifest {
  pub started_at:      Option<DateTime<Utc>>,
  pub finished_at:     Option<DateTime<Utc>>,
  /// Versions of the repair tables in force.
  pub repair_versions: BTreeMap<String, u32>,
  pub processed:       u64,
  pub accepted:        u64,
  pub rejected:        u64,
  pub by_reason:       BTreeMap<RejectReason, u64>,
  /// Rejection samples, capped at the loader's sample limit. `by_reason`
  /// always holds the full counts.
  pub rejections:      Vec<Rejection>,
  /// New keys registered per vocabulary.
  pub registered:      BTreeMap<String, u64>,
  /// Repaired tokens per field: `field → corrupted token → count`.
  pub repaired:        BTreeMap<String, BTreeMap<String, u64>>,
  /// Tokens mapped to a sentinel: `field → raw token → count`.
  pub unresolved:      BTreeMap<String, BTreeMap<String, u64>>,
  /// Empty source fields per field.
  pub missing:         BTreeMap<String, u64>,
  /// Catalog registration conflicts that were tolerated.
  pub warnings:        Vec<String>,
}

impl LoadManifest {
  pub fn record_rejection(&mut self, rejection: Rejection, sample_limit: usize) {
    self.rejected += 1;
    *self.by_reason.entry(rejection.reason).or_default() += 1;
    if self.rejections.len() < sample_limit {
      self.rejections.push(rejection);
    }
  }

  /// Fold one accepted field's resolution into the audit counters.
  pub fn record_resolution(&mut self, field: &str, resolution: &Resolution) {
    match resolution {
      Resolution::Exact | Resolution::New => {}
      Resolution::Missing => *self.missing.entry(field.to_owned()).or_default() += 1,
      Resolution::Repaired { from } => bump(&mut self.repaired, field, from),
      Resolution::Unresolved { raw } => bump(&mut self.unresolved, field, raw),
    }
  }

  pub fn count(&self, reason: RejectReason) -> u64 {
    self.by_reason.get(&reason).copied().unwrap_or(0)
  }
}

fn bump(map: &mut BTreeMap<String, BTreeMap<String, u64>>, field: &str, token: &str) {
  *map
    .entry(field.to_owned())
    .or_default()
    .entry(token.to_owned())
    .or_default() += 1;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rejection(reason: RejectReason) -> Rejection {
    Rejection { line: Some(2), reason, detail: String::new(), raw: None }
  }

  #[test]
  fn samples_are_capped_but_counts_are_not() {
    let mut m = LoadManifest::default();
    for _ in 0..5 {
      m.record_rejection(rejection(RejectReason::InvalidAge), 2);
    }
    assert_eq!(m.rejected, 5);
    assert_eq!(m.count(RejectReason::InvalidAge), 5);
    assert_eq!(m.rejections.len(), 2);
  }

  #[test]
  fn resolutions_are_tallied_per_field() {
    let mut m = LoadManifest::default();
    m.record_resolution("tax_status", &Resolution::Repaired { from: "2ACTIVO".into() });
    m.record_resolution("tax_status", &Resolution::Repaired { from: "2ACTIVO".into() });
    m.record_resolution("company_type", &Resolution::Unresolved { raw: "A7".into() });
    m.record_resolution("sex", &Resolution::Missing);
    m.record_resolution("sex", &Resolution::Exact);

    assert_eq!(m.repaired["tax_status"]["2ACTIVO"], 2);
    assert_eq!(m.unresolved["company_type"]["A7"], 1);
    assert_eq!(m.missing["sex"], 1);
  }
}
