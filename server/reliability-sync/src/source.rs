//! PostgreSQL event store: drains the source tables into an in-memory snapshot.

use chrono::NaiveDateTime;
use reliability_engine::types::AssetId;
use reliability_engine::{Config, EngineError, FailureEvent, MaintenanceEvent, MemoryStore};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::{PgConnection, PgPool, Postgres};
use tracing::debug;

use crate::sql;

/// One `(machineID, datetime)` row. Stored timestamps carry no zone and are read as UTC.
pub type EventRow = (AssetId, NaiveDateTime);

pub struct PgEventStore<'a> {
  pool: &'a PgPool,
  config: &'a Config,
}

fn unavailable(what: &str, e: sqlx_core::Error) -> EngineError {
  EngineError::source_unavailable(format!("{}: {}", what, e))
}

impl<'a> PgEventStore<'a> {
  pub fn new(pool: &'a PgPool, config: &'a Config) -> Self {
    Self { pool, config }
  }

  async fn fetch_events(
    &self,
    conn: &mut PgConnection,
    table: &str,
  ) -> Result<Vec<EventRow>, EngineError> {
    let stmt = sql::select_events(&self.config.schema, table)?;
    let rows = query_as::<Postgres, EventRow>(&stmt)
      .fetch_all(conn)
      .await
      .map_err(|e| unavailable(table, e))?;
    debug!(table, rows = rows.len(), "fetched events");
    Ok(rows)
  }

  async fn fetch_assets(&self, conn: &mut PgConnection) -> Result<Vec<AssetId>, EngineError> {
    let stmt = sql::select_assets(&self.config.schema)?;
    query_scalar::<Postgres, AssetId>(&stmt)
      .fetch_all(conn)
      .await
      .map_err(|e| unavailable(sql::MACHINES_TABLE, e))
  }

  async fn connection(
    &self,
  ) -> Result<sqlx_core::pool::PoolConnection<Postgres>, EngineError> {
    self.pool.acquire().await.map_err(|e| unavailable("pool", e))
  }

  pub async fn list_failures(&self) -> Result<Vec<FailureEvent>, EngineError> {
    let mut conn = self.connection().await?;
    let rows = self.fetch_events(&mut *conn, sql::FAILURES_TABLE).await?;
    Ok(failures_from_rows(rows))
  }

  pub async fn list_maintenance_events(&self) -> Result<Vec<MaintenanceEvent>, EngineError> {
    let mut conn = self.connection().await?;
    let rows = self.fetch_events(&mut *conn, sql::MAINTENANCE_TABLE).await?;
    Ok(maintenance_from_rows(rows))
  }

  pub async fn list_assets(&self) -> Result<Vec<AssetId>, EngineError> {
    let mut conn = self.connection().await?;
    self.fetch_assets(&mut *conn).await
  }

  /// Read everything one engine run needs. The registry is only read for full-fleet runs.
  ///
  /// All reads share one REPEATABLE READ, READ ONLY transaction, so a concurrent
  /// writer cannot split the snapshot between the failure and maintenance tables.
  pub async fn snapshot(&self) -> Result<MemoryStore, EngineError> {
    let mut tx = self.pool.begin().await.map_err(|e| unavailable("begin", e))?;
    query::<Postgres>(sql::SNAPSHOT_ISOLATION)
      .execute(&mut *tx)
      .await
      .map_err(|e| unavailable("isolation", e))?;

    let failures = failures_from_rows(self.fetch_events(&mut *tx, sql::FAILURES_TABLE).await?);
    if failures.is_empty() {
      tx.rollback().await.map_err(|e| unavailable("rollback", e))?;
      return Ok(MemoryStore::default());
    }
    let maintenance =
      maintenance_from_rows(self.fetch_events(&mut *tx, sql::MAINTENANCE_TABLE).await?);
    let assets = if self.config.full_fleet {
      self.fetch_assets(&mut *tx).await?
    } else {
      Vec::new()
    };
    tx.commit().await.map_err(|e| unavailable("commit", e))?;
    Ok(MemoryStore::new(failures, maintenance).with_assets(assets))
  }
}

pub fn failures_from_rows(rows: Vec<EventRow>) -> Vec<FailureEvent> {
  rows
    .into_iter()
    .map(|(asset_id, ts)| FailureEvent {
      asset_id,
      timestamp: ts.and_utc(),
    })
    .collect()
}

pub fn maintenance_from_rows(rows: Vec<EventRow>) -> Vec<MaintenanceEvent> {
  rows
    .into_iter()
    .map(|(asset_id, ts)| MaintenanceEvent {
      asset_id,
      timestamp: ts.and_utc(),
    })
    .collect()
}
