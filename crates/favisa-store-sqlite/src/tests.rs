//! Integration tests for `SqliteStore` against an in-memory database.

use favisa_core::{
  catalog::{CatalogEntry, EntryMetadata},
  loader::{FactLoader, LoadError, LoaderConfig, RowOutcome, bootstrap},
  manifest::{LoadManifest, RejectReason},
  normalize::Normalizer,
  report::NewAnalysisResult,
  staging::StagedRow,
  store::{CatalogWrite, InsertOutcome, TaxpayerQuery, TaxpayerStore},
  taxpayer::{Age, Ruc, Sex, Taxpayer},
  vocabulary::Vocabulary,
};
use rust_decimal::Decimal;
use strum::IntoEnumIterator as _;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A store with every baseline catalog seeded.
async fn seeded() -> SqliteStore {
  let s = store().await;
  bootstrap(&s).await.expect("bootstrap");
  s
}

fn ruc(n: u64) -> Ruc { Ruc::new(n).unwrap() }

fn dec(s: &str) -> Decimal { s.parse().unwrap() }

/// A taxpayer whose every categorical key is the sentinel.
fn taxpayer(n: u64) -> Taxpayer {
  Taxpayer {
    ruc:                ruc(n),
    activity:           Vocabulary::Activity.sentinel().into(),
    company_type:       Vocabulary::CompanyType.sentinel().into(),
    company_size:       Vocabulary::CompanySize.sentinel().into(),
    location:           Vocabulary::Location.sentinel().into(),
    tax_status:         Vocabulary::TaxStatus.sentinel().into(),
    domicile_condition: Vocabulary::DomicileCondition.sentinel().into(),
    sex:                Sex::Undetermined,
    age:                None,
    debt:               Decimal::ZERO,
  }
}

/// Run a raw statement and report whether SQLite refused it.
async fn refused(s: &SqliteStore, sql: impl Into<String>) -> bool {
  let sql = sql.into();
  s.conn
    .call(move |conn| Ok(conn.execute_batch(&sql).is_err()))
    .await
    .unwrap()
}

// ─── Catalogs ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_seeds_every_baseline() {
  let s = store().await;
  let registry = bootstrap(&s).await.unwrap();

  for vocabulary in Vocabulary::iter() {
    let stored = s.list_catalog(vocabulary).await.unwrap();
    assert_eq!(stored.len(), vocabulary.baseline().len(), "{vocabulary}");
    assert!(stored.iter().any(|e| e.key == vocabulary.sentinel()));
    assert_eq!(registry.len(vocabulary), stored.len());
  }
}

#[tokio::test]
async fn bootstrap_twice_changes_nothing() {
  let s = seeded().await;
  let before = s.list_catalog(Vocabulary::TaxStatus).await.unwrap();

  bootstrap(&s).await.unwrap();
  let after = s.list_catalog(Vocabulary::TaxStatus).await.unwrap();
  assert_eq!(before, after);
}

#[tokio::test]
async fn bootstrap_absorbs_previously_registered_keys() {
  let s = seeded().await;
  let entry = Vocabulary::Location.placeholder("021809").unwrap();
  s.ensure_catalog_entry(Vocabulary::Location, entry.clone())
    .await
    .unwrap();

  let registry = bootstrap(&s).await.unwrap();
  assert_eq!(registry.lookup(Vocabulary::Location, "021809").unwrap(), &entry);
}

#[tokio::test]
async fn catalog_entry_roundtrips_metadata() {
  let s = seeded().await;
  let entry = Vocabulary::Activity.placeholder("4711").unwrap();
  let write = s
    .ensure_catalog_entry(Vocabulary::Activity, entry.clone())
    .await
    .unwrap();
  assert_eq!(write, CatalogWrite::Inserted);

  let fetched = s
    .get_catalog_entry(Vocabulary::Activity, "4711".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched, entry);
  assert!(matches!(
    fetched.metadata,
    EntryMetadata::Activity { division: Some(ref d), .. } if d == "47"
  ));
}

#[tokio::test]
async fn ensure_existing_key_keeps_stored_entry() {
  let s = seeded().await;
  let rival = CatalogEntry::new("ACTIVO", "Something else", EntryMetadata::Plain);

  let write = s
    .ensure_catalog_entry(Vocabulary::TaxStatus, rival)
    .await
    .unwrap();
  let CatalogWrite::Existing(existing) = write else {
    panic!("expected the stored entry, got {write:?}");
  };
  assert_eq!(existing.description, "Activo");
}

#[tokio::test]
async fn ensure_rejects_foreign_metadata() {
  let s = seeded().await;
  let entry = CatalogEntry::new("X", "x", EntryMetadata::Plain);
  let err = s
    .ensure_catalog_entry(Vocabulary::Activity, entry)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(favisa_core::Error::MetadataMismatch { .. })
  ));
}

#[tokio::test]
async fn get_catalog_entry_missing_returns_none() {
  let s = seeded().await;
  let missing = s
    .get_catalog_entry(Vocabulary::CompanySize, "XL".into())
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn remove_unreferenced_entry() {
  let s = seeded().await;
  s.remove_catalog_entry(Vocabulary::TaxStatus, "12".into())
    .await
    .unwrap();
  assert!(
    s.get_catalog_entry(Vocabulary::TaxStatus, "12".into())
      .await
      .unwrap()
      .is_none()
  );

  let err = s
    .remove_catalog_entry(Vocabulary::TaxStatus, "12".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CatalogNotFound { .. }));
}

#[tokio::test]
async fn remove_referenced_entry_is_refused() {
  let s = seeded().await;
  let mut t = taxpayer(20_123_456_789);
  t.tax_status = "ACTIVO".into();
  s.insert_taxpayer(&t).await.unwrap();

  let err = s
    .remove_catalog_entry(Vocabulary::TaxStatus, "ACTIVO".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CatalogInUse { .. }));
  assert!(
    s.get_catalog_entry(Vocabulary::TaxStatus, "ACTIVO".into())
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn sentinels_cannot_be_removed_or_renamed() {
  let s = seeded().await;
  let err = s
    .remove_catalog_entry(Vocabulary::CompanyType, "-".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SentinelProtected { .. }));

  let err = s
    .rename_catalog_key(Vocabulary::CompanySize, "B".into(), "Z".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SentinelProtected { .. }));
}

#[tokio::test]
async fn rename_cascades_into_facts() {
  let s = seeded().await;
  let entry = Vocabulary::Activity.placeholder("4711").unwrap();
  s.ensure_catalog_entry(Vocabulary::Activity, entry).await.unwrap();
  let mut t = taxpayer(10_000_001);
  t.activity = "4711".into();
  s.insert_taxpayer(&t).await.unwrap();

  s.rename_catalog_key(Vocabulary::Activity, "4711".into(), "47110".into())
    .await
    .unwrap();

  let stored = s.get_taxpayer(t.ruc).await.unwrap().unwrap();
  assert_eq!(stored.activity, "47110");
  assert!(
    s.get_catalog_entry(Vocabulary::Activity, "4711".into())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn rename_onto_existing_key_is_refused() {
  let s = seeded().await;
  let err = s
    .rename_catalog_key(Vocabulary::TaxStatus, "10".into(), "11".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CatalogKeyTaken { ref key, .. } if key == "11"));

  let err = s
    .rename_catalog_key(Vocabulary::TaxStatus, "99".into(), "98".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CatalogNotFound { .. }));
}

// ─── Facts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_taxpayer() {
  let s = seeded().await;
  let mut t = taxpayer(20_123_456_789);
  t.sex = Sex::Male;
  t.age = Age::new(35);
  t.debt = dec("150.00");

  assert_eq!(s.insert_taxpayer(&t).await.unwrap(), InsertOutcome::Inserted);
  let stored = s.get_taxpayer(t.ruc).await.unwrap().unwrap();
  assert_eq!(stored, t);
  assert_eq!(s.count_taxpayers().await.unwrap(), 1);
}

#[tokio::test]
async fn get_taxpayer_missing_returns_none() {
  let s = seeded().await;
  assert!(s.get_taxpayer(ruc(42)).await.unwrap().is_none());
  assert!(s.view_taxpayer(ruc(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_ruc_keeps_first_row() {
  let s = seeded().await;
  let first = taxpayer(20_123_456_789);
  let mut second = first.clone();
  second.debt = dec("999");

  s.insert_taxpayer(&first).await.unwrap();
  assert_eq!(
    s.insert_taxpayer(&second).await.unwrap(),
    InsertOutcome::Duplicate
  );
  let stored = s.get_taxpayer(first.ruc).await.unwrap().unwrap();
  assert_eq!(stored.debt, Decimal::ZERO);
}

#[tokio::test]
async fn unknown_catalog_key_is_a_constraint_violation() {
  let s = seeded().await;
  let mut t = taxpayer(10_000_002);
  t.tax_status = "BOGUS".into();

  let outcome = s.insert_taxpayer(&t).await.unwrap();
  assert!(matches!(outcome, InsertOutcome::ConstraintViolation(_)));
  assert_eq!(s.count_taxpayers().await.unwrap(), 0);
}

#[tokio::test]
async fn schema_rejects_out_of_range_values() {
  let s = seeded().await;
  let row = |extra: &str| {
    format!(
      "INSERT INTO contribuyente (ruc, id_ciiu, id_tipo_empresa, id_tamano, \
       id_ubicacion, id_estado, id_condicion{extra}"
    )
  };

  let cases = [
    ", edad) VALUES (1, 'ND', '-', 'B', 'ND', 'ND', 'ND', 150)",
    ", deuda) VALUES (2, 'ND', '-', 'B', 'ND', 'ND', 'ND', '-5.00')",
    ", deuda) VALUES (3, 'ND', '-', 'B', 'ND', 'ND', 'ND', '1.2.3')",
    ", sexo) VALUES (4, 'ND', '-', 'B', 'ND', 'ND', 'ND', 'X')",
    ") VALUES (0, 'ND', '-', 'B', 'ND', 'ND', 'ND')",
    ") VALUES (5, 'ND', '-', 'B', 'ND', 'NOPE', 'ND')",
    ", deuda) VALUES (6, 'ND', '-', 'B', 'ND', 'ND', 'ND', '.')",
    ", deuda) VALUES (7, 'ND', '-', 'B', 'ND', 'ND', 'ND', '1.')",
    ", deuda) VALUES (8, 'ND', '-', 'B', 'ND', 'ND', 'ND', '.5')",
  ];
  for case in cases {
    assert!(refused(&s, row(case)).await, "accepted: {case}");
  }
  assert_eq!(s.count_taxpayers().await.unwrap(), 0);
}

#[tokio::test]
async fn facts_are_immutable() {
  let s = seeded().await;
  s.insert_taxpayer(&taxpayer(7)).await.unwrap();

  assert!(refused(&s, "UPDATE contribuyente SET deuda = '1' WHERE ruc = 7").await);
  assert!(refused(&s, "UPDATE contribuyente SET ruc = 8 WHERE ruc = 7").await);
  let stored = s.get_taxpayer(ruc(7)).await.unwrap().unwrap();
  assert_eq!(stored.debt, Decimal::ZERO);
}

#[tokio::test]
async fn view_resolves_descriptions() {
  let s = seeded().await;
  let location = Vocabulary::Location.placeholder("021809").unwrap();
  s.ensure_catalog_entry(Vocabulary::Location, location).await.unwrap();
  let mut t = taxpayer(20_123_456_789);
  t.location = "021809".into();
  t.tax_status = "ACTIVO".into();
  t.domicile_condition = "HABIDO".into();
  s.insert_taxpayer(&t).await.unwrap();

  let view = s.view_taxpayer(t.ruc).await.unwrap().unwrap();
  assert_eq!(view.tax_status.key, "ACTIVO");
  assert_eq!(view.tax_status.description, "Activo");
  assert_eq!(view.location.description, "021809");
  assert_eq!(view.province.as_deref(), Some("Santa"));
  assert_eq!(view.department.as_deref(), Some("Áncash"));
  assert_eq!(view.company_type.key, "-");
}

#[tokio::test]
async fn list_taxpayers_filters_and_pages() {
  let s = seeded().await;
  for n in 1..=5u64 {
    let mut t = taxpayer(n);
    if n % 2 == 1 {
      t.tax_status = "ACTIVO".into();
    }
    s.insert_taxpayer(&t).await.unwrap();
  }

  let active = s
    .list_taxpayers(&TaxpayerQuery {
      tax_status: Some("ACTIVO".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  let rucs: Vec<u64> = active.iter().map(|t| t.ruc.get()).collect();
  assert_eq!(rucs, [1, 3, 5]);

  let page = s
    .list_taxpayers(&TaxpayerQuery {
      limit: Some(2),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  let rucs: Vec<u64> = page.iter().map(|t| t.ruc.get()).collect();
  assert_eq!(rucs, [2, 3]);
}

// ─── Reporting ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_aggregates_facts() {
  let s = seeded().await;
  let debts = [("0", "ACTIVO"), ("100.50", "ACTIVO"), ("49.50", "INACTIVO")];
  for (i, (debt, status)) in debts.iter().enumerate() {
    let mut t = taxpayer(i as u64 + 1);
    t.debt = dec(debt);
    t.tax_status = (*status).into();
    s.insert_taxpayer(&t).await.unwrap();
  }

  let summary = s.summary(5).await.unwrap();
  assert_eq!(summary.total_taxpayers, 3);
  assert_eq!(summary.active_taxpayers, 2);
  assert_eq!(summary.by_tax_status[0].key, "ACTIVO");
  assert_eq!(summary.by_tax_status[0].count, 2);
  assert_eq!(summary.debt.debtors, 2);
  assert_eq!(summary.debt.total, dec("150.00"));
  assert_eq!(summary.debt.average, dec("75.00"));
  assert_eq!(summary.debt.maximum, dec("100.50"));
  assert_eq!(summary.top_districts.len(), 1);
  assert_eq!(summary.top_districts[0].count, 3);

  let facts = summary
    .table_counts
    .iter()
    .find(|t| t.table == "contribuyente")
    .unwrap();
  assert_eq!(facts.rows, 3);
}

#[tokio::test]
async fn summary_of_empty_store() {
  let s = seeded().await;
  let summary = s.summary(5).await.unwrap();
  assert_eq!(summary.total_taxpayers, 0);
  assert_eq!(summary.debt.debtors, 0);
  assert_eq!(summary.debt.average, Decimal::ZERO);
  assert!(summary.top_districts.is_empty());
}

#[tokio::test]
async fn summary_reports_debt_overflow() {
  let s = seeded().await;
  for n in 1..=2 {
    let mut t = taxpayer(n);
    t.debt = dec("50000000000000000000000000000");
    s.insert_taxpayer(&t).await.unwrap();
  }

  let err = s.summary(5).await.unwrap_err();
  assert!(matches!(err, Error::DebtOverflow));
}

#[tokio::test]
async fn results_are_append_only() {
  let s = seeded().await;
  let new = |analysis: &str, value: f64| NewAnalysisResult {
    analysis:      analysis.into(),
    category:      Some("estado".into()),
    metric:        Some("count".into()),
    numeric_value: Some(value),
    text_value:    None,
  };

  let first = s.append_result(new("by_status", 1.0)).await.unwrap();
  s.append_result(new("by_status", 2.0)).await.unwrap();
  s.append_result(new("debt", 3.0)).await.unwrap();

  let all = s.list_results(None).await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(all[0].id, first.id);

  let filtered = s.list_results(Some("by_status".into())).await.unwrap();
  assert_eq!(filtered.len(), 2);
  assert!(filtered.iter().all(|r| r.analysis == "by_status"));

  assert!(refused(&s, "DELETE FROM resultado_analisis").await);
  assert!(refused(&s, "UPDATE resultado_analisis SET metrica = 'x'").await);
}

// ─── Loader end to end ───────────────────────────────────────────────────────

fn staged(line: u64, ruc: &str) -> StagedRow {
  StagedRow {
    line: Some(line),
    ruc: Some(ruc.into()),
    ..Default::default()
  }
}

/// The row used throughout the documentation.
fn reference_row() -> StagedRow {
  StagedRow {
    activity: Some("4711".into()),
    company_type: Some("A7".into()),
    company_size: Some("M".into()),
    location: Some("021809".into()),
    tax_status: Some("2ACTIVO".into()),
    domicile_condition: Some("2HABIDO".into()),
    sex: Some("H".into()),
    age: Some("35".into()),
    debt: Some("150.00".into()),
    ..staged(2, "20123456789")
  }
}

async fn load(
  s: &SqliteStore,
  rows: Vec<StagedRow>,
) -> Result<LoadManifest, LoadError> {
  let mut registry = bootstrap(s).await?;
  let normalizer = Normalizer::builtin().unwrap();
  let loader = FactLoader::new(s, &mut registry, &normalizer, LoaderConfig::default());
  loader
    .load_all(rows.into_iter().map(Ok::<_, std::convert::Infallible>))
    .await
}

fn without_timestamps(mut m: LoadManifest) -> LoadManifest {
  m.started_at = None;
  m.finished_at = None;
  m
}

#[tokio::test]
async fn reference_row_normalizes() {
  let s = store().await;
  let manifest = load(&s, vec![reference_row()]).await.unwrap();
  assert_eq!(manifest.accepted, 1);

  let t = s.get_taxpayer(ruc(20_123_456_789)).await.unwrap().unwrap();
  assert_eq!(t.company_type, "-");
  assert_eq!(t.tax_status, "ACTIVO");
  assert_eq!(t.domicile_condition, "HABIDO");
  assert_eq!(t.activity, "4711");
  assert_eq!(t.location, "021809");
  assert_eq!(t.sex, Sex::Male);
  assert_eq!(t.age, Age::new(35));
  assert_eq!(t.debt, dec("150.00"));

  assert_eq!(manifest.repaired["tax_status"]["2ACTIVO"], 1);
  assert_eq!(manifest.unresolved["company_type"]["A7"], 1);
  assert_eq!(manifest.registered["activity"], 1);
}

#[tokio::test]
async fn discovered_keys_persist_before_facts() {
  let s = store().await;
  load(&s, vec![reference_row()]).await.unwrap();

  let activity = s
    .get_catalog_entry(Vocabulary::Activity, "4711".into())
    .await
    .unwrap()
    .unwrap();
  assert!(activity.is_placeholder(Vocabulary::Activity));
  let location = s
    .get_catalog_entry(Vocabulary::Location, "021809".into())
    .await
    .unwrap()
    .unwrap();
  assert!(location.is_placeholder(Vocabulary::Location));
  assert!(
    s.get_catalog_entry(Vocabulary::CompanyType, "A7".into())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn duplicate_rows_first_wins() {
  let s = store().await;
  let mut second = reference_row();
  second.line = Some(3);
  second.debt = Some("999.99".into());

  let manifest = load(&s, vec![reference_row(), second]).await.unwrap();
  assert_eq!(manifest.accepted, 1);
  assert_eq!(manifest.count(RejectReason::DuplicateIdentifier), 1);
  assert_eq!(manifest.rejections[0].line, Some(3));

  let t = s.get_taxpayer(ruc(20_123_456_789)).await.unwrap().unwrap();
  assert_eq!(t.debt, dec("150.00"));
}

#[tokio::test]
async fn duplicate_row_registers_no_keys() {
  let s = store().await;
  let second = StagedRow {
    line: Some(3),
    activity: Some("9999".into()),
    location: Some("021801".into()),
    ..reference_row()
  };

  let manifest = load(&s, vec![reference_row(), second]).await.unwrap();
  assert_eq!(manifest.count(RejectReason::DuplicateIdentifier), 1);
  assert_eq!(manifest.registered["activity"], 1);
  assert_eq!(manifest.registered["location"], 1);
  assert!(
    s.get_catalog_entry(Vocabulary::Activity, "9999".into())
      .await
      .unwrap()
      .is_none()
  );
  assert!(
    s.get_catalog_entry(Vocabulary::Location, "021801".into())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn out_of_range_rows_are_rejected() {
  let s = store().await;
  let old = StagedRow { age: Some("150".into()), ..staged(2, "10000001") };
  let owing = StagedRow { debt: Some("-5.00".into()), ..staged(3, "10000002") };
  let bad_ruc = staged(4, "abc");

  let manifest = load(&s, vec![old, owing, bad_ruc]).await.unwrap();
  assert_eq!(manifest.accepted, 0);
  assert_eq!(manifest.count(RejectReason::InvalidAge), 1);
  assert_eq!(manifest.count(RejectReason::InvalidDebt), 1);
  assert_eq!(manifest.count(RejectReason::InvalidIdentifier), 1);
  assert_eq!(s.count_taxpayers().await.unwrap(), 0);
}

#[tokio::test]
async fn every_accepted_fact_resolves_in_every_catalog() {
  let s = store().await;
  let rows = vec![
    reference_row(),
    StagedRow { tax_status: Some("weird".into()), ..staged(3, "10000003") },
    StagedRow {
      company_size: Some("xl".into()),
      location: Some("021801".into()),
      ..staged(4, "10000004")
    },
    staged(5, "10000005"),
  ];
  let manifest = load(&s, rows).await.unwrap();
  assert_eq!(manifest.accepted, 4);

  for t in s.list_taxpayers(&TaxpayerQuery::default()).await.unwrap() {
    let view = s.view_taxpayer(t.ruc).await.unwrap();
    assert!(view.is_some(), "ruc {} lost a catalog join", t.ruc);
  }
}

#[tokio::test]
async fn loading_is_deterministic() {
  let rows = vec![
    reference_row(),
    StagedRow { sex: Some("femenino".into()), ..staged(3, "10000006") },
    StagedRow { age: Some("abc".into()), ..staged(4, "10000007") },
    StagedRow { location: Some("021801".into()), ..staged(5, "10000008") },
  ];

  let a = store().await;
  let b = store().await;
  let ma = load(&a, rows.clone()).await.unwrap();
  let mb = load(&b, rows).await.unwrap();
  assert_eq!(without_timestamps(ma), without_timestamps(mb));

  let query = TaxpayerQuery::default();
  assert_eq!(
    a.list_taxpayers(&query).await.unwrap(),
    b.list_taxpayers(&query).await.unwrap()
  );
  for vocabulary in Vocabulary::iter() {
    assert_eq!(
      a.list_catalog(vocabulary).await.unwrap(),
      b.list_catalog(vocabulary).await.unwrap()
    );
  }
}

#[tokio::test]
async fn second_run_rejects_already_loaded_rows() {
  let s = store().await;
  load(&s, vec![reference_row()]).await.unwrap();

  let manifest = load(&s, vec![reference_row()]).await.unwrap();
  assert_eq!(manifest.accepted, 0);
  assert_eq!(manifest.count(RejectReason::DuplicateIdentifier), 1);
}

#[tokio::test]
async fn malformed_records_are_counted() {
  let s = store().await;
  let mut registry = bootstrap(&s).await.unwrap();
  let normalizer = Normalizer::builtin().unwrap();
  let mut loader =
    FactLoader::new(&s, &mut registry, &normalizer, LoaderConfig::default());

  loader.record_malformed("line 7: unterminated quote".into());
  let outcome = loader.load_row(reference_row()).await.unwrap();
  assert_eq!(outcome, RowOutcome::Accepted(ruc(20_123_456_789)));

  let manifest = loader.finish();
  assert_eq!(manifest.processed, 2);
  assert_eq!(manifest.count(RejectReason::MalformedRow), 1);
  assert!(manifest.rejections[0].raw.is_none());
}
