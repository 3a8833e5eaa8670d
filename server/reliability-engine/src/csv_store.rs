//! Event store backed by the fleet's CSV exports.
//!
//! Expects `PdM_failures.csv`, `PdM_maint.csv` and `PdM_machines.csv` in one
//! directory, each with a header row and a `machineID` column.

use std::fs::File;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::EngineError;
use crate::normalize::{self, RawAssetRow, RawEventRow};
use crate::store::EventStore;
use crate::types::{AssetId, FailureEvent, MaintenanceEvent};

pub const FAILURES_FILE: &str = "PdM_failures.csv";
pub const MAINTENANCE_FILE: &str = "PdM_maint.csv";
pub const MACHINES_FILE: &str = "PdM_machines.csv";

#[derive(Debug, Clone)]
pub struct CsvEventStore {
  dir: PathBuf,
  timestamp_format: String,
  allow_missing_maintenance: bool,
}

impl CsvEventStore {
  pub fn new(dir: impl Into<PathBuf>, config: &Config) -> Self {
    Self {
      dir: dir.into(),
      timestamp_format: config.timestamp_format.clone(),
      allow_missing_maintenance: config.allow_missing_maintenance,
    }
  }

  /// Deserialize every row of `file`, mapping each through `convert`.
  fn read_rows<R, T, F>(&self, file: &str, convert: F) -> Result<Vec<T>, EngineError>
  where
    R: DeserializeOwned,
    F: Fn(&R) -> Result<T, EngineError>,
  {
    let path = self.dir.join(file);
    let handle = File::open(&path)
      .map_err(|e| EngineError::source_unavailable(format!("{}: {}", path.display(), e)))?;
    let mut reader = csv::ReaderBuilder::new()
      .trim(csv::Trim::All)
      .from_reader(handle);

    let headers = reader
      .headers()
      .map_err(|e| EngineError::parse(format!("{}:1: {}", file, e)))?
      .clone();

    let mut out = Vec::new();
    for record in reader.records() {
      // Physical line where the record starts; blank lines and quoted newlines count.
      let record = record.map_err(|e| {
        let line = e.position().map(|p| p.line()).unwrap_or(0);
        EngineError::parse(format!("{}:{}: {}", file, line, e))
      })?;
      let line = record.position().map(|p| p.line()).unwrap_or(0);
      let raw: R = record
        .deserialize(Some(&headers))
        .map_err(|e| EngineError::parse(format!("{}:{}: {}", file, line, e)))?;
      let item = convert(&raw).map_err(|e| EngineError::parse(format!("{}:{}: {}", file, line, e)))?;
      out.push(item);
    }
    debug!(file, rows = out.len(), "read export");
    Ok(out)
  }
}

impl EventStore for CsvEventStore {
  fn list_failures(&self) -> Result<Vec<FailureEvent>, EngineError> {
    self.read_rows::<RawEventRow, _, _>(FAILURES_FILE, |raw: &RawEventRow| {
      normalize::failure(raw, &self.timestamp_format)
    })
  }

  fn list_maintenance_events(&self) -> Result<Vec<MaintenanceEvent>, EngineError> {
    if self.allow_missing_maintenance && !self.dir.join(MAINTENANCE_FILE).exists() {
      warn!(file = MAINTENANCE_FILE, "maintenance export missing; treating as empty");
      return Ok(Vec::new());
    }
    self.read_rows::<RawEventRow, _, _>(MAINTENANCE_FILE, |raw: &RawEventRow| {
      normalize::maintenance(raw, &self.timestamp_format)
    })
  }

  fn list_assets(&self) -> Result<Vec<AssetId>, EngineError> {
    self.read_rows::<RawAssetRow, _, _>(MACHINES_FILE, |raw: &RawAssetRow| Ok(raw.machine_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn store_with(files: &[(&str, &str)], config: &Config) -> (tempfile::TempDir, CsvEventStore) {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in files {
      fs::write(dir.path().join(name), body).unwrap();
    }
    let store = CsvEventStore::new(dir.path(), config);
    (dir, store)
  }

  #[test]
  fn reads_failures_and_ignores_extra_columns() {
    let (_dir, store) = store_with(
      &[(
        FAILURES_FILE,
        "datetime,machineID,failure\n2015-01-05 06:00:00,1,comp4\n2015-03-06 06:00:00,1,comp1\n",
      )],
      &Config::default(),
    );
    let failures = store.list_failures().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[1].asset_id, 1);
  }

  #[test]
  fn missing_file_is_source_unavailable() {
    let (_dir, store) = store_with(&[], &Config::default());
    let err = store.list_failures().unwrap_err();
    assert!(matches!(err, EngineError::SourceUnavailable(_)));
  }

  #[test]
  fn bad_row_reports_file_and_line() {
    let (_dir, store) = store_with(
      &[(
        MAINTENANCE_FILE,
        "datetime,machineID,comp\n2015-01-05 06:00:00,1,comp2\nnot-a-date,1,comp3\n",
      )],
      &Config::default(),
    );
    let err = store.list_maintenance_events().unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
    assert!(err.to_string().contains("PdM_maint.csv:3"), "{}", err);
  }

  #[test]
  fn bad_row_line_counts_blank_lines_and_quoted_newlines() {
    let (_dir, store) = store_with(
      &[(
        MAINTENANCE_FILE,
        concat!(
          "datetime,machineID,comp\n",
          "2015-01-05 06:00:00,1,comp2\n",
          "\n",
          "\n",
          "2015-01-06 06:00:00,1,\"comp3\nreplaced\"\n",
          "not-a-date,1,comp4\n",
        ),
      )],
      &Config::default(),
    );
    let err = store.list_maintenance_events().unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
    assert!(err.to_string().contains("PdM_maint.csv:7"), "{}", err);
  }

  #[test]
  fn undecodable_field_reports_its_line() {
    let (_dir, store) = store_with(
      &[(
        FAILURES_FILE,
        "datetime,machineID,failure\n\n2015-01-05 06:00:00,one,comp4\n",
      )],
      &Config::default(),
    );
    let err = store.list_failures().unwrap_err();
    assert!(err.to_string().contains("PdM_failures.csv:3"), "{}", err);
  }

  #[test]
  fn missing_maintenance_allowed_when_configured() {
    let config = Config {
      allow_missing_maintenance: true,
      ..Config::default()
    };
    let (_dir, store) = store_with(&[], &config);
    assert!(store.list_maintenance_events().unwrap().is_empty());
  }

  #[test]
  fn reads_registry() {
    let (_dir, store) = store_with(
      &[(MACHINES_FILE, "machineID,model,age\n1,model3,18\n2,model4,7\n")],
      &Config::default(),
    );
    assert_eq!(store.list_assets().unwrap(), vec![1, 2]);
  }
}
