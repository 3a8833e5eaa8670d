//! Normalize raw export rows into canonical events.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::EngineError;
use crate::types::{AssetId, FailureEvent, MaintenanceEvent};

/// One row of a failure or maintenance export. Unknown columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEventRow {
  #[serde(rename = "machineID")]
  pub machine_id: AssetId,
  pub datetime: String,
}

/// One row of the asset registry export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAssetRow {
  #[serde(rename = "machineID")]
  pub machine_id: AssetId,
}

/// Parse a timestamp in the configured naive format (read as UTC), or RFC3339.
pub fn parse_timestamp(raw: &str, format: &str) -> Result<DateTime<Utc>, EngineError> {
  let s = raw.trim();
  if s.is_empty() {
    return Err(EngineError::validation("datetime", "must not be empty"));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
    return Ok(naive.and_utc());
  }
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| {
      EngineError::validation(
        "datetime",
        &format!("expected `{}` or RFC3339, got `{}`", format, s),
      )
    })
}

pub fn failure(raw: &RawEventRow, format: &str) -> Result<FailureEvent, EngineError> {
  Ok(FailureEvent {
    asset_id: raw.machine_id,
    timestamp: parse_timestamp(&raw.datetime, format)?,
  })
}

pub fn maintenance(raw: &RawEventRow, format: &str) -> Result<MaintenanceEvent, EngineError> {
  Ok(MaintenanceEvent {
    asset_id: raw.machine_id,
    timestamp: parse_timestamp(&raw.datetime, format)?,
  })
}
