//! The six controlled vocabularies and their fixed baselines.
//!
//! Each vocabulary owns a sentinel key meaning "undetermined", a baseline set
//! of entries that is seeded into every fresh store, and a registration
//! policy deciding whether unknown tokens may become new keys.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::catalog::{CatalogEntry, EntryMetadata};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// One categorical dimension of the taxpayer fact.
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
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Vocabulary {
  /// CIIU economic activity code (`ACTIVIDAD_ECONOMICA`).
  Activity,
  /// Legal company type (`TIPO_EMPRESA`).
  CompanyType,
  /// Company size band (`TAMANO_EMPRESA`).
  CompanySize,
  /// District / ubigeo (`UBICACION_GEOGRAFICA`).
  Location,
  /// Tax status (`ESTADO_TRIBUTARIO`).
  TaxStatus,
  /// Fiscal domicile condition (`CONDICION_DOMICILIO`).
  DomicileCondition,
}

/// Whether a vocabulary may grow while scanning source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
  /// Unknown tokens resolve to the sentinel. Used for identity-bearing and
  /// status vocabularies, where a guessed key could misstate a legal status.
  Strict,
  /// Unknown tokens become new keys with a placeholder description.
  AutoRegister,
}

impl Vocabulary {
  /// The key meaning "undetermined"; always a baseline member.
  pub fn sentinel(self) -> &'static str {
    match self {
      Self::Activity => "ND",
      Self::CompanyType => "-",
      Self::CompanySize => "B",
      Self::Location => "ND",
      Self::TaxStatus => "ND",
      Self::DomicileCondition => "ND",
    }
  }

  pub fn policy(self) -> RegistrationPolicy {
    match self {
      Self::Activity | Self::Location => RegistrationPolicy::AutoRegister,
      Self::CompanyType
      | Self::CompanySize
      | Self::TaxStatus
      | Self::DomicileCondition => RegistrationPolicy::Strict,
    }
  }

  /// Name of the backing catalog table.
  pub fn table(self) -> &'static str {
    match self {
      Self::Activity => "actividad_economica",
      Self::CompanyType => "tipo_empresa",
      Self::CompanySize => "tamano_empresa",
      Self::Location => "ubicacion_geografica",
      Self::TaxStatus => "estado_tributario",
      Self::DomicileCondition => "condicion_domicilio",
    }
  }

  /// Name of the primary-key column in [`Self::table`], which is also the
  /// foreign-key column name on the fact table.
  pub fn key_column(self) -> &'static str {
    match self {
      Self::Activity => "id_ciiu",
      Self::CompanyType => "id_tipo_empresa",
      Self::CompanySize => "id_tamano",
      Self::Location => "id_ubicacion",
      Self::TaxStatus => "id_estado",
      Self::DomicileCondition => "id_condicion",
    }
  }

  /// The entries every fresh catalog starts with, sentinel included.
  pub fn baseline(self) -> Vec<CatalogEntry> {
    match self {
      Self::Activity => vec![CatalogEntry::new(
        "ND",
        "Actividad no determinada",
        EntryMetadata::Activity { seccion: None, division: None },
      )],
      Self::CompanyType => [
        ("A", "Empresa tipo A"),
        ("B", "Empresa tipo B"),
        ("C", "Empresa tipo C"),
        ("CE", "Empresa tipo CE"),
        ("D", "Empresa tipo D"),
        ("E", "Empresa tipo E"),
        ("-", "Tipo no determinado"),
      ]
      .into_iter()
      .map(|(key, description)| {
        CatalogEntry::new(key, description, EntryMetadata::CompanyType {
          abreviatura: Some(key.to_owned()),
        })
      })
      .collect(),
      Self::CompanySize => [
        ("C", "Pequeña empresa", Some("Ventas anuales hasta 1700 UIT")),
        ("M", "Mediana empresa", Some("Ventas anuales de 1700 a 2300 UIT")),
        ("G", "Gran empresa", Some("Ventas anuales superiores a 2300 UIT")),
        ("B", "Tamaño no determinado", None),
      ]
      .into_iter()
      .map(|(key, description, criterio)| {
        CatalogEntry::new(key, description, EntryMetadata::CompanySize {
          criterio_ventas: criterio.map(str::to_owned),
        })
      })
      .collect(),
      Self::Location => vec![CatalogEntry::new(
        "ND",
        "NO DETERMINADO",
        EntryMetadata::Location {
          provincia:     None,
          departamento:  None,
          ubigeo_codigo: None,
        },
      )],
      Self::TaxStatus => coded_baseline(
        &["ACTIVO", "10", "11", "3", "2", "1", "12", "INACTIVO", "ND"],
        |key| match key {
          "ACTIVO" => "Activo".to_owned(),
          "INACTIVO" => "Inactivo".to_owned(),
          "ND" => "Estado no determinado".to_owned(),
          code => format!("Estado tributario código {code}"),
        },
      ),
      Self::DomicileCondition => coded_baseline(
        &[
          "HABIDO", "12", "1", "5", "2", "3", "4", "6", "7", "8", "9", "10", "11",
          "ND",
        ],
        |key| match key {
          "HABIDO" => "Habido".to_owned(),
          "ND" => "Condición no determinada".to_owned(),
          code => format!("Condición de domicilio código {code}"),
        },
      ),
    }
  }

  /// The description given to a key registered while scanning source data.
  /// `None` for [`RegistrationPolicy::Strict`] vocabularies.
  pub fn placeholder(self, key: &str) -> Option<CatalogEntry> {
    match self {
      Self::Activity => Some(CatalogEntry::new(
        key,
        format!("Actividad económica código {key}"),
        EntryMetadata::Activity {
          seccion:  None,
          division: Some(key.chars().take(2).collect()),
        },
      )),
      Self::Location => Some(CatalogEntry::new(key, key, EntryMetadata::Location {
        provincia:     Some("Santa".to_owned()),
        departamento:  Some("Áncash".to_owned()),
        ubigeo_codigo: (key.len() == 6 && key.bytes().all(|b| b.is_ascii_digit()))
          .then(|| key.to_owned()),
      })),
      _ => None,
    }
  }
}

fn coded_baseline(
  keys: &[&str],
  describe: impl Fn(&str) -> String,
) -> Vec<CatalogEntry> {
  keys
    .iter()
    .map(|&key| CatalogEntry::new(key, describe(key), EntryMetadata::Plain))
    .collect()
}
