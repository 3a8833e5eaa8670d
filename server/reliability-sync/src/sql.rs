//! SQL text for the source tables and the artifact. Identifiers are validated
//! and quoted; values always go through bind parameters.

use reliability_engine::materialize::{validate_identifier, COLUMNS};
use reliability_engine::EngineError;

pub const FAILURES_TABLE: &str = "failures";
pub const MAINTENANCE_TABLE: &str = "maint";
pub const MACHINES_TABLE: &str = "machines";

/// First statement of the snapshot transaction; must run before any read.
pub const SNAPSHOT_ISOLATION: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// Postgres caps bind parameters per statement at 65535.
const MAX_BIND_PARAMS: usize = 65_535;

fn quote(name: &str) -> String {
  format!("\"{}\"", name)
}

/// `"schema"."table"`, after checking both are plain identifiers.
pub fn qualified(schema: &str, table: &str) -> Result<String, EngineError> {
  validate_identifier("schema", schema)?;
  validate_identifier("table", table)?;
  Ok(format!("{}.{}", quote(schema), quote(table)))
}

pub fn select_events(schema: &str, table: &str) -> Result<String, EngineError> {
  Ok(format!(
    r#"SELECT "machineID", datetime FROM {} ORDER BY "machineID", datetime"#,
    qualified(schema, table)?
  ))
}

pub fn select_assets(schema: &str) -> Result<String, EngineError> {
  Ok(format!(
    r#"SELECT "machineID" FROM {} ORDER BY "machineID""#,
    qualified(schema, MACHINES_TABLE)?
  ))
}

pub fn create_schema(schema: &str) -> Result<String, EngineError> {
  validate_identifier("schema", schema)?;
  Ok(format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema)))
}

pub fn create_table(schema: &str, table: &str) -> Result<String, EngineError> {
  Ok(format!(
    r#"CREATE TABLE IF NOT EXISTS {} ("machineID" INTEGER PRIMARY KEY, "MTBF_hours" DOUBLE PRECISION NOT NULL, "MTTR_hours" DOUBLE PRECISION NOT NULL, "total_failures" BIGINT NOT NULL)"#,
    qualified(schema, table)?
  ))
}

pub fn delete_all(schema: &str, table: &str) -> Result<String, EngineError> {
  Ok(format!("DELETE FROM {}", qualified(schema, table)?))
}

/// Multi-row INSERT with `rows * 4` positional parameters.
pub fn insert_rows(schema: &str, table: &str, rows: usize) -> Result<String, EngineError> {
  if rows == 0 {
    return Err(EngineError::validation("rows", "insert needs at least one row"));
  }
  if rows * COLUMNS.len() > MAX_BIND_PARAMS {
    return Err(EngineError::validation("rows", "batch exceeds bind parameter limit"));
  }
  let columns: Vec<String> = COLUMNS.iter().map(|c| quote(c)).collect();
  let values: Vec<String> = (0..rows)
    .map(|r| {
      let base = r * COLUMNS.len();
      let params: Vec<String> = (1..=COLUMNS.len()).map(|c| format!("${}", base + c)).collect();
      format!("({})", params.join(", "))
    })
    .collect();
  Ok(format!(
    "INSERT INTO {} ({}) VALUES {}",
    qualified(schema, table)?,
    columns.join(", "),
    values.join(", ")
  ))
}

/// Largest batch `insert_rows` accepts.
pub fn max_batch_rows() -> usize {
  MAX_BIND_PARAMS / COLUMNS.len()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn select_events_is_quoted_and_ordered() {
    assert_eq!(
      select_events("maintenance", FAILURES_TABLE).unwrap(),
      r#"SELECT "machineID", datetime FROM "maintenance"."failures" ORDER BY "machineID", datetime"#
    );
  }

  #[test]
  fn snapshot_is_repeatable_read_and_read_only() {
    assert!(SNAPSHOT_ISOLATION.starts_with("SET TRANSACTION"));
    assert!(SNAPSHOT_ISOLATION.contains("REPEATABLE READ"));
    assert!(SNAPSHOT_ISOLATION.ends_with("READ ONLY"));
  }

  #[test]
  fn create_table_uses_artifact_columns() {
    let sql = create_table("maintenance", "reliability_stats").unwrap();
    assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "maintenance"."reliability_stats""#));
    for col in COLUMNS {
      assert!(sql.contains(&format!("\"{}\"", col)), "missing {}", col);
    }
  }

  #[test]
  fn insert_numbers_parameters_row_major() {
    let sql = insert_rows("maintenance", "reliability_stats", 2).unwrap();
    assert_eq!(
      sql,
      r#"INSERT INTO "maintenance"."reliability_stats" ("machineID", "MTBF_hours", "MTTR_hours", "total_failures") VALUES ($1, $2, $3, $4), ($5, $6, $7, $8)"#
    );
  }

  #[test]
  fn insert_rejects_empty_and_oversized_batches() {
    assert!(insert_rows("maintenance", "t", 0).is_err());
    assert!(insert_rows("maintenance", "t", max_batch_rows()).is_ok());
    assert!(insert_rows("maintenance", "t", max_batch_rows() + 1).is_err());
  }

  #[test]
  fn hostile_identifiers_are_rejected() {
    let err = qualified("maintenance\"; DROP SCHEMA public; --", "t").unwrap_err();
    assert!(err.to_string().contains("schema"));
    assert!(create_schema("").is_err());
    assert!(delete_all("maintenance", "stats; --").is_err());
  }
}
