//! PostgreSQL materializer: transactional full replace of the artifact table.

use reliability_engine::materialize::digest_rows;
use reliability_engine::{AssetReliabilitySummary, Config, EngineError, MaterializeReport};
use sqlx_core::query::query;
use sqlx_postgres::{PgPool, Postgres};
use tracing::info;

use crate::sql;

/// Postgres counterpart of `Materializer`. The trait is synchronous, so this type
/// exposes an async `replace` with the same contract instead of implementing it.
pub struct PgMaterializer<'a> {
  pool: &'a PgPool,
  config: &'a Config,
}

fn write_err(table: &str, e: sqlx_core::Error) -> EngineError {
  EngineError::write_failure(format!("{}: {}", table, e))
}

impl<'a> PgMaterializer<'a> {
  pub fn new(pool: &'a PgPool, config: &'a Config) -> Self {
    Self { pool, config }
  }

  /// Replace all rows of `<schema>.<table>` in one transaction.
  ///
  /// Readers keep seeing the previous rows until COMMIT. Any error drops the
  /// transaction, which rolls it back.
  pub async fn replace(
    &self,
    table: &str,
    rows: &[AssetReliabilitySummary],
  ) -> Result<MaterializeReport, EngineError> {
    let schema = self.config.schema.as_str();
    let create_schema = sql::create_schema(schema)?;
    let create_table = sql::create_table(schema, table)?;
    let delete_all = sql::delete_all(schema, table)?;
    let batch = self.config.insert_batch_size.clamp(1, sql::max_batch_rows());
    let digest = digest_rows(rows)?;

    let mut tx = self.pool.begin().await.map_err(|e| write_err(table, e))?;
    for stmt in [&create_schema, &create_table, &delete_all] {
      query::<Postgres>(stmt)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_err(table, e))?;
    }

    for chunk in rows.chunks(batch) {
      let insert = sql::insert_rows(schema, table, chunk.len())?;
      let mut q = query::<Postgres>(&insert);
      for row in chunk {
        let total = i64::try_from(row.total_failures)
          .map_err(|_| EngineError::validation("total_failures", "exceeds BIGINT"))?;
        q = q
          .bind(row.asset_id)
          .bind(row.mtbf_hours)
          .bind(row.mttr_hours)
          .bind(total);
      }
      q.execute(&mut *tx).await.map_err(|e| write_err(table, e))?;
    }

    tx.commit().await.map_err(|e| write_err(table, e))?;
    info!(schema, table, rows = rows.len(), digest = %digest, "artifact replaced");
    Ok(MaterializeReport {
      table: format!("{}.{}", schema, table),
      rows: rows.len(),
      digest,
    })
  }
}
