//! The staging representation of one source row: raw, untyped, unvalidated.

use serde::{Deserialize, Serialize};

/// One source record as read, before normalisation. Every field is the
/// trimmed source text, `None` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedRow {
  /// 1-based line number in the source file, when known.
  pub line:               Option<u64>,
  pub ruc:                Option<String>,
  pub activity:           Option<String>,
  pub company_type:       Option<String>,
  pub company_size:       Option<String>,
  pub location:           Option<String>,
  pub tax_status:         Option<String>,
  pub domicile_condition: Option<String>,
  pub sex:                Option<String>,
  pub age:                Option<String>,
  pub debt:               Option<String>,
}

impl StagedRow {
  /// The raw token for a categorical column.
  pub fn token(&self, vocabulary: crate::vocabulary::Vocabulary) -> Option<&str> {
    use crate::vocabulary::Vocabulary::*;
    match vocabulary {
      Activity => self.activity.as_deref(),
      CompanyType => self.company_type.as_deref(),
      CompanySize => self.company_size.as_deref(),
      Location => self.location.as_deref(),
      TaxStatus => self.tax_status.as_deref(),
      DomicileCondition => self.domicile_condition.as_deref(),
    }
  }
}
