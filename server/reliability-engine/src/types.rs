//! Core types for the reliability engine (event model + output contract).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Integer identifier of a tracked machine.
pub type AssetId = i32;

// ---------------------------------------------------------------------------
// Source events (what the event store returns)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureEvent {
  pub asset_id: AssetId,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceEvent {
  pub asset_id: AssetId,
  pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Merged stream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  Failure,
  Maintenance,
}

/// One event of the asset-partitioned, time-ordered union of both sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedEvent {
  pub asset_id: AssetId,
  pub timestamp: DateTime<Utc>,
  pub kind: EventKind,
}

impl From<&FailureEvent> for MergedEvent {
  fn from(e: &FailureEvent) -> Self {
    Self {
      asset_id: e.asset_id,
      timestamp: e.timestamp,
      kind: EventKind::Failure,
    }
  }
}

impl From<&MaintenanceEvent> for MergedEvent {
  fn from(e: &MaintenanceEvent) -> Self {
    Self {
      asset_id: e.asset_id,
      timestamp: e.timestamp,
      kind: EventKind::Maintenance,
    }
  }
}

// ---------------------------------------------------------------------------
// Intervals
// ---------------------------------------------------------------------------

/// A merged event plus the time since the previous event of the same asset.
///
/// `elapsed` is `None` for the first event of each asset. It is never zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalRecord {
  pub asset_id: AssetId,
  pub timestamp: DateTime<Utc>,
  pub kind: EventKind,
  pub elapsed: Option<TimeDelta>,
}

impl IntervalRecord {
  pub fn elapsed_hours(&self) -> Option<f64> {
    self.elapsed.map(hours)
  }
}

/// Exact fractional hours of a duration (millisecond resolution).
pub fn hours(d: TimeDelta) -> f64 {
  d.num_milliseconds() as f64 / 3_600_000.0
}

// ---------------------------------------------------------------------------
// Output types (artifact contract: column names are read by name downstream)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReliabilitySummary {
  #[serde(rename = "machineID")]
  pub asset_id: AssetId,
  #[serde(rename = "MTBF_hours")]
  pub mtbf_hours: f64,
  #[serde(rename = "MTTR_hours")]
  pub mttr_hours: f64,
  pub total_failures: u64,
}

impl AssetReliabilitySummary {
  /// Row for an asset with no qualifying events.
  pub fn empty(asset_id: AssetId) -> Self {
    Self {
      asset_id,
      mtbf_hours: 0.0,
      mttr_hours: 0.0,
      total_failures: 0,
    }
  }
}

/// Outcome of a successful artifact replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
  pub table: String,
  pub rows: usize,
  /// blake3 hex digest of the canonical CSV encoding of the rows.
  pub digest: String,
}

// ---------------------------------------------------------------------------
// CLI output wrappers
// ---------------------------------------------------------------------------

/// Structured error line for a failed run.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub kind: String,
  pub message: String,
}

impl ErrorOutput {
  pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      error: true,
      kind: kind.into(),
      message: message.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn two_hours_of_minutes_is_exactly_two() {
    assert_eq!(hours(TimeDelta::minutes(120)), 2.0);
  }

  #[test]
  fn half_hour_is_not_truncated() {
    assert_eq!(hours(TimeDelta::minutes(30)), 0.5);
    assert_eq!(hours(TimeDelta::seconds(5_400)), 1.5);
  }

  #[test]
  fn summary_serializes_with_artifact_column_names() {
    let row = AssetReliabilitySummary {
      asset_id: 7,
      mtbf_hours: 14.75,
      mttr_hours: 0.5,
      total_failures: 3,
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["machineID"], 7);
    assert_eq!(json["MTBF_hours"], 14.75);
    assert_eq!(json["MTTR_hours"], 0.5);
    assert_eq!(json["total_failures"], 3);
  }
}
