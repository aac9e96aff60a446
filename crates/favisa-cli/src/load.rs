//! The `load` subcommand.

use std::{fmt::Display, path::Path};

use anyhow::Context as _;
use favisa_core::{
  loader::{FactLoader, LoaderConfig, bootstrap},
  manifest::LoadManifest,
  normalize::Normalizer,
  staging::StagedRow,
  store::TaxpayerStore,
};

/// What a load invocation did.
#[derive(Debug)]
pub enum LoadRun {
  /// The store already held facts; nothing was read.
  Skipped { existing: u64 },
  Completed(LoadManifest),
}

/// Bootstrap catalogs and stream `rows` into `store`, unless it already
/// holds taxpayers.
pub async fn load_rows<S, I, E>(
  store: &S,
  normalizer: &Normalizer,
  config: LoaderConfig,
  rows: impl FnOnce() -> anyhow::Result<I>,
) -> anyhow::Result<LoadRun>
where
  S: TaxpayerStore,
  I: IntoIterator<Item = Result<StagedRow, E>>,
  E: Display,
{
  let mut registry = bootstrap(store).await.context("catalog bootstrap failed")?;

  let existing = store
    .count_taxpayers()
    .await
    .context("failed to count taxpayers")?;
  if existing > 0 {
    tracing::info!(existing, "store already holds taxpayers; skipping load");
    return Ok(LoadRun::Skipped { existing });
  }

  let rows = rows()?;
  let loader = FactLoader::new(store, &mut registry, normalizer, config);
  let manifest = loader.load_all(rows).await?;
  Ok(LoadRun::Completed(manifest))
}

/// [`load_rows`] over the CSV file at `csv_path`.
pub async fn load_csv<S: TaxpayerStore>(
  store: &S,
  normalizer: &Normalizer,
  config: LoaderConfig,
  csv_path: &Path,
) -> anyhow::Result<LoadRun> {
  load_rows(store, normalizer, config, || {
    tracing::info!(path = %csv_path.display(), "reading source");
    favisa_staging::open(csv_path)
      .with_context(|| format!("failed to open {}", csv_path.display()))
  })
  .await
}

#[cfg(test)]
mod tests {
  use favisa_core::manifest::RejectReason;
  use favisa_store_sqlite::SqliteStore;

  use super::*;

  const CSV: &[u8] = b"ddp_numruc,ddp_ciiu,ddp_tpoemp,ddp_tamano,ddp_ubigeo,\
ddp_estado,ddp_flag22,dds_sexo,dds_edad,deuda,condicion\n\
20123456789,4711,A7,M,021809,2ACTIVO,2HABIDO,H,35,150.00,1\n\
20123456789,4711,A,M,021809,ACTIVO,HABIDO,M,40,10,1\n\
10000001,,,,,,,,150,,\n";

  async fn run(store: &SqliteStore) -> LoadRun {
    let normalizer = Normalizer::builtin().unwrap();
    load_rows(store, &normalizer, LoaderConfig::default(), || {
      Ok(favisa_staging::from_reader(CSV)?)
    })
    .await
    .unwrap()
  }

  #[tokio::test]
  async fn loads_csv_into_empty_store() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let LoadRun::Completed(manifest) = run(&store).await else {
      panic!("expected a load");
    };
    assert_eq!(manifest.processed, 3);
    assert_eq!(manifest.accepted, 1);
    assert_eq!(manifest.count(RejectReason::DuplicateIdentifier), 1);
    assert_eq!(manifest.count(RejectReason::InvalidAge), 1);
  }

  #[tokio::test]
  async fn populated_store_is_skipped() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    run(&store).await;
    assert!(matches!(run(&store).await, LoadRun::Skipped { existing: 1 }));
  }
}
