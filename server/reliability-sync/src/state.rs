//! Per-invocation session: one pool and one config, passed to every stage.

use reliability_engine::engine::log_report;
use reliability_engine::{Config, Engine, MaterializeReport};
use sqlx_postgres::PgPool;
use tracing::info;

use crate::error::SyncError;
use crate::sink::PgMaterializer;
use crate::source::PgEventStore;

pub struct SyncSession {
  pub pool: PgPool,
  pub config: Config,
}

impl SyncSession {
  pub async fn connect(database_url: &str, config: Config) -> Result<Self, SyncError> {
    let pool = PgPool::connect(database_url)
      .await
      .map_err(SyncError::Database)?;
    Ok(Self { pool, config })
  }

  /// One full refresh: snapshot the sources, compute, replace the artifact.
  ///
  /// Same steps as `Engine::refresh`, with the reads and the write awaited.
  /// Nothing is written when the failure table is empty.
  pub async fn refresh(&self) -> Result<MaterializeReport, SyncError> {
    info!(schema = %self.config.schema, table = %self.config.table_name, "starting refresh");
    let snapshot = PgEventStore::new(&self.pool, &self.config).snapshot().await?;
    let publication = Engine::new(self.config.clone()).prepare(&snapshot)?;
    let report = PgMaterializer::new(&self.pool, &self.config)
      .replace(&publication.table, &publication.rows)
      .await?;
    log_report(&report);
    Ok(report)
  }
}
