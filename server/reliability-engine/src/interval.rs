//! Time elapsed since the previous event of the same asset.

use std::collections::BTreeMap;

use crate::types::{AssetId, IntervalRecord, MergedEvent};

/// Emit one `IntervalRecord` per merged event.
///
/// Events are grouped by asset; within a group (already time-ordered) each record
/// carries `timestamp[i] - timestamp[i-1]`, regardless of the previous event's kind.
/// The first event of each asset gets `elapsed = None`.
pub fn compute_intervals(merged: &[MergedEvent]) -> Vec<IntervalRecord> {
  let mut groups: BTreeMap<AssetId, Vec<&MergedEvent>> = BTreeMap::new();
  for event in merged {
    groups.entry(event.asset_id).or_default().push(event);
  }

  let mut records = Vec::with_capacity(merged.len());
  for events in groups.values() {
    let mut prev: Option<&MergedEvent> = None;
    for event in events {
      records.push(IntervalRecord {
        asset_id: event.asset_id,
        timestamp: event.timestamp,
        kind: event.kind,
        elapsed: prev.map(|p| event.timestamp - p.timestamp),
      });
      prev = Some(event);
    }
  }
  records
}
