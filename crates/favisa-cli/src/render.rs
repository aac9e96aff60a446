//! Plain-text renderings for terminal output. `--json` bypasses these.

use std::fmt::{self, Display, Formatter};

use favisa_core::{catalog::CatalogEntry, manifest::LoadManifest, report::Summary};

/// Operator-facing report of one load run.
pub fn manifest(m: &LoadManifest) -> String { ManifestText(m).to_string() }

/// The executive summary.
pub fn summary(s: &Summary) -> String { SummaryText(s).to_string() }

pub fn catalog(entries: &[CatalogEntry]) -> String {
  CatalogText(entries).to_string()
}

struct ManifestText<'a>(&'a LoadManifest);

impl Display for ManifestText<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let m = self.0;
    writeln!(f, "Load manifest")?;
    if let (Some(start), Some(end)) = (m.started_at, m.finished_at) {
      let secs = (end - start).num_milliseconds() as f64 / 1000.0;
      writeln!(f, "  duration:  {secs:.1}s")?;
    }
    writeln!(f, "  processed: {}", m.processed)?;
    writeln!(f, "  accepted:  {}", m.accepted)?;
    writeln!(f, "  rejected:  {}", m.rejected)?;
    for (reason, count) in &m.by_reason {
      writeln!(f, "    {reason:<24} {count:>8}")?;
    }

    if !m.repair_versions.is_empty() {
      let versions: Vec<String> =
        m.repair_versions.iter().map(|(t, v)| format!("{t} v{v}")).collect();
      writeln!(f, "  repair tables: {}", versions.join(", "))?;
    }

    section(f, "registered keys", m.registered.iter())?;
    section(f, "missing fields", m.missing.iter())?;
    for (title, map) in [("repaired", &m.repaired), ("unresolved", &m.unresolved)] {
      if map.is_empty() {
        continue;
      }
      writeln!(f, "  {title}:")?;
      for (field, tokens) in map {
        for (token, count) in tokens {
          writeln!(f, "    {field:<20} {token:<16} {count:>8}")?;
        }
      }
    }

    if !m.warnings.is_empty() {
      writeln!(f, "  warnings:")?;
      for w in &m.warnings {
        writeln!(f, "    {w}")?;
      }
    }
    Ok(())
  }
}

fn section<'a>(
  f: &mut Formatter<'_>,
  title: &str,
  rows: impl ExactSizeIterator<Item = (&'a String, &'a u64)>,
) -> fmt::Result {
  if rows.len() == 0 {
    return Ok(());
  }
  writeln!(f, "  {title}:")?;
  for (name, count) in rows {
    writeln!(f, "    {name:<24} {count:>8}")?;
  }
  Ok(())
}

struct SummaryText<'a>(&'a Summary);

impl Display for SummaryText<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let s = self.0;
    writeln!(f, "Taxpayers: {}", s.total_taxpayers)?;
    writeln!(f, "Active:    {}", s.active_taxpayers)?;

    writeln!(f, "\nBy tax status:")?;
    for c in &s.by_tax_status {
      writeln!(f, "  {:<35} {:>8}", c.description, c.count)?;
    }

    let d = &s.debt;
    writeln!(f, "\nDebt ({} debtors):", d.debtors)?;
    writeln!(f, "  total:   {}", d.total)?;
    writeln!(f, "  average: {}", d.average)?;
    writeln!(f, "  maximum: {}", d.maximum)?;

    writeln!(f, "\nTop districts:")?;
    for c in &s.top_districts {
      writeln!(f, "  {:<30} {:>8}", c.description, c.count)?;
    }

    writeln!(f, "\nTables:")?;
    for t in &s.table_counts {
      writeln!(f, "  {:<24} {:>8}", t.table, t.rows)?;
    }
    Ok(())
  }
}

struct CatalogText<'a>(&'a [CatalogEntry]);

impl Display for CatalogText<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    for e in self.0 {
      writeln!(f, "{:<10} {}", e.key, e.description)?;
    }
    Ok(())
  }
}
