//! Full-replace persistence of the summary set.
//!
//! A replace either lands in full or leaves the previous artifact untouched.
//! Concurrent writers are not serialized; the last successful replace wins.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::error::EngineError;
use crate::types::{AssetReliabilitySummary, MaterializeReport};

/// Artifact columns, in order. Downstream readers query them by name.
pub const COLUMNS: [&str; 4] = ["machineID", "MTBF_hours", "MTTR_hours", "total_failures"];

pub trait Materializer {
  /// Replace the whole content of `table` with `rows`.
  fn replace(
    &mut self,
    table: &str,
    rows: &[AssetReliabilitySummary],
  ) -> Result<MaterializeReport, EngineError>;
}

/// Canonical CSV encoding of a summary set (header always present).
pub fn encode_csv(rows: &[AssetReliabilitySummary]) -> Result<Vec<u8>, EngineError> {
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(Vec::new());
  writer
    .write_record(COLUMNS)
    .map_err(|e| EngineError::write_failure(format!("encode: {}", e)))?;
  for row in rows {
    writer
      .serialize(row)
      .map_err(|e| EngineError::write_failure(format!("encode: {}", e)))?;
  }
  writer
    .into_inner()
    .map_err(|e| EngineError::write_failure(format!("encode: {}", e)))
}

/// blake3 digest of the canonical encoding, recorded with every replace.
pub fn digest_rows(rows: &[AssetReliabilitySummary]) -> Result<String, EngineError> {
  let bytes = encode_csv(rows)?;
  Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Table names end up in file names and SQL; keep them to plain identifiers.
pub fn validate_identifier(field: &str, name: &str) -> Result<(), EngineError> {
  let mut chars = name.chars();
  let head_ok = chars
    .next()
    .map(|c| c.is_ascii_alphabetic() || c == '_')
    .unwrap_or(false);
  if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
    return Err(EngineError::validation(
      field,
      &format!("`{}` is not a plain identifier", name),
    ));
  }
  Ok(())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryMaterializer {
  tables: HashMap<String, Vec<AssetReliabilitySummary>>,
  fail_next: bool,
  writes: u64,
}

impl MemoryMaterializer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn table(&self, name: &str) -> Option<&[AssetReliabilitySummary]> {
    self.tables.get(name).map(Vec::as_slice)
  }

  /// Number of successful replaces so far.
  pub fn writes(&self) -> u64 {
    self.writes
  }

  /// Make the next `replace` fail without touching stored tables.
  pub fn fail_next_write(&mut self) {
    self.fail_next = true;
  }
}

impl Materializer for MemoryMaterializer {
  fn replace(
    &mut self,
    table: &str,
    rows: &[AssetReliabilitySummary],
  ) -> Result<MaterializeReport, EngineError> {
    validate_identifier("table", table)?;
    if std::mem::take(&mut self.fail_next) {
      return Err(EngineError::write_failure(format!("{}: destination unavailable", table)));
    }
    let digest = digest_rows(rows)?;
    self.tables.insert(table.to_string(), rows.to_vec());
    self.writes += 1;
    Ok(MaterializeReport {
      table: table.to_string(),
      rows: rows.len(),
      digest,
    })
  }
}

// ---------------------------------------------------------------------------
// CSV file (temp file + rename)
// ---------------------------------------------------------------------------

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Writes `<dir>/<table>.csv` via a sibling temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct CsvMaterializer {
  dir: PathBuf,
  fail_before_rename: bool,
}

impl CsvMaterializer {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: dir.into(),
      fail_before_rename: false,
    }
  }

  /// Fail the next replace after the temp file is written, before the rename.
  #[cfg(test)]
  pub(crate) fn fail_next_rename(&mut self) {
    self.fail_before_rename = true;
  }

  pub fn path_for(&self, table: &str) -> PathBuf {
    self.dir.join(format!("{}.csv", table))
  }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
  let mut file = File::create(path)?;
  file.write_all(bytes)?;
  file.sync_all()
}

impl Materializer for CsvMaterializer {
  fn replace(
    &mut self,
    table: &str,
    rows: &[AssetReliabilitySummary],
  ) -> Result<MaterializeReport, EngineError> {
    validate_identifier("table", table)?;
    let bytes = encode_csv(rows)?;
    let target = self.path_for(table);
    let temp = self.dir.join(format!(
      ".{}.csv.{}-{}.tmp",
      table,
      std::process::id(),
      TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    let fail_rename = std::mem::take(&mut self.fail_before_rename);
    let written = write_synced(&temp, &bytes).and_then(|_| {
      if fail_rename {
        return Err(std::io::Error::other("rename interrupted"));
      }
      fs::rename(&temp, &target)
    });
    if let Err(e) = written {
      let _ = fs::remove_file(&temp);
      return Err(EngineError::write_failure(format!("{}: {}", target.display(), e)));
    }

    let report = MaterializeReport {
      table: table.to_string(),
      rows: rows.len(),
      digest: blake3::hash(&bytes).to_hex().to_string(),
    };
    info!(path = %target.display(), rows = report.rows, digest = %report.digest, "artifact replaced");
    Ok(report)
  }
}
