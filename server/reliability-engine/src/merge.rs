//! Union of failure and maintenance events into one asset-partitioned, time-ordered stream.

use crate::types::{FailureEvent, MaintenanceEvent, MergedEvent};

/// Merge both sources, sorted by `(asset_id, timestamp)`.
///
/// The sort is stable: events sharing an asset and timestamp keep input order,
/// failures before maintenance.
pub fn merge(failures: &[FailureEvent], maintenance: &[MaintenanceEvent]) -> Vec<MergedEvent> {
  let mut merged: Vec<MergedEvent> = failures
    .iter()
    .map(MergedEvent::from)
    .chain(maintenance.iter().map(MergedEvent::from))
    .collect();
  merged.sort_by_key(|e| (e.asset_id, e.timestamp));
  merged
}
