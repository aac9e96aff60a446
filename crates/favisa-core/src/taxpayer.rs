//! Taxpayer facts: one immutable row per RUC.

use std::{fmt, num::NonZeroU64, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::vocabulary::Vocabulary;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A taxpayer identifier (RUC). Always positive and representable as a
/// SQLite `INTEGER`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ruc(NonZeroU64);

impl Ruc {
  pub fn new(value: u64) -> Option<Self> {
    (value <= i64::MAX as u64)
      .then_some(value)
      .and_then(NonZeroU64::new)
      .map(Self)
  }

  pub fn get(self) -> u64 { self.0.get() }
}

impl fmt::Display for Ruc {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for Ruc {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let value: u64 = s
      .trim()
      .parse()
      .map_err(|_| format!("{s:?} is not a positive integer"))?;
    Self::new(value).ok_or_else(|| format!("{s:?} is out of range"))
  }
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
pub enum Sex {
  #[serde(rename = "HOMBRE")]
  #[strum(serialize = "HOMBRE")]
  Male,
  #[serde(rename = "MUJER")]
  #[strum(serialize = "MUJER")]
  Female,
  #[default]
  #[serde(rename = "ND")]
  #[strum(serialize = "ND")]
  Undetermined,
}

// ─── Age ─────────────────────────────────────────────────────────────────────

/// An age in whole years, within `0..=120`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Age(u8);

impl Age {
  pub const MAX: u8 = 120;

  pub fn new(years: u8) -> Option<Self> { (years <= Self::MAX).then_some(Self(years)) }

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<u8> for Age {
  type Error = String;

  fn try_from(years: u8) -> Result<Self, Self::Error> {
    Self::new(years).ok_or_else(|| format!("age {years} is outside 0..={}", Self::MAX))
  }
}

impl From<Age> for u8 {
  fn from(age: Age) -> Self { age.0 }
}

// ─── Fact ────────────────────────────────────────────────────────────────────

/// A normalised taxpayer row. Every categorical field holds a catalog key,
/// never a raw source token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxpayer {
  pub ruc:                Ruc,
  pub activity:           String,
  pub company_type:       String,
  pub company_size:       String,
  pub location:           String,
  pub tax_status:         String,
  pub domicile_condition: String,
  pub sex:                Sex,
  pub age:                Option<Age>,
  /// Outstanding debt; never negative.
  pub debt:               Decimal,
}

impl Taxpayer {
  /// The foreign key this fact holds for `vocabulary`.
  pub fn key(&self, vocabulary: Vocabulary) -> &str {
    match vocabulary {
      Vocabulary::Activity => &self.activity,
      Vocabulary::CompanyType => &self.company_type,
      Vocabulary::CompanySize => &self.company_size,
      Vocabulary::Location => &self.location,
      Vocabulary::TaxStatus => &self.tax_status,
      Vocabulary::DomicileCondition => &self.domicile_condition,
    }
  }
}

// ─── Denormalised view ───────────────────────────────────────────────────────

/// A catalog key together with its resolved description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Described {
  pub key:         String,
  pub description: String,
}

/// One taxpayer with every catalog description resolved; the read model the
/// reporting side consumes. Never stored, always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerView {
  pub ruc:                Ruc,
  pub activity:           Described,
  pub company_type:       Described,
  pub company_size:       Described,
  /// Described by the district name.
  pub location:           Described,
  pub province:           Option<String>,
  pub department:         Option<String>,
  pub tax_status:         Described,
  pub domicile_condition: Described,
  pub sex:                Sex,
  pub age:                Option<Age>,
  pub debt:               Decimal,
}
