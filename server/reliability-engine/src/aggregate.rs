//! Per-asset KPI reduction: MTBF, MTTR and failure counts.

use std::collections::BTreeMap;

use crate::types::{AssetId, AssetReliabilitySummary, EventKind, IntervalRecord};

/// Running arithmetic mean over present intervals only.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
  sum: f64,
  count: u64,
}

impl Mean {
  fn push(&mut self, value: f64) {
    self.sum += value;
    self.count += 1;
  }

  fn value(self) -> f64 {
    if self.count == 0 {
      0.0
    } else {
      self.sum / self.count as f64
    }
  }
}

#[derive(Debug, Default)]
struct AssetAccumulator {
  between_failures: Mean,
  between_maintenance: Mean,
  failures: u64,
}

/// Reduce interval records to one summary per asset, ordered by asset id.
///
/// Only assets that appear in `records` are emitted. Absent intervals are skipped,
/// never averaged in as zero; `total_failures` counts failure events, intervals or not.
pub fn aggregate(records: &[IntervalRecord]) -> Vec<AssetReliabilitySummary> {
  let mut groups: BTreeMap<AssetId, AssetAccumulator> = BTreeMap::new();

  for record in records {
    let acc = groups.entry(record.asset_id).or_default();
    let hours = record.elapsed_hours();
    match record.kind {
      EventKind::Failure => {
        acc.failures += 1;
        if let Some(h) = hours {
          acc.between_failures.push(h);
        }
      }
      EventKind::Maintenance => {
        if let Some(h) = hours {
          acc.between_maintenance.push(h);
        }
      }
    }
  }

  groups
    .into_iter()
    .map(|(asset_id, acc)| AssetReliabilitySummary {
      asset_id,
      mtbf_hours: acc.between_failures.value(),
      mttr_hours: acc.between_maintenance.value(),
      total_failures: acc.failures,
    })
    .collect()
}

/// Left-join summaries against the asset registry.
///
/// Registry assets without events get a zero row. Opt-in only: `aggregate` never
/// does this on its own.
pub fn with_fleet(
  summaries: Vec<AssetReliabilitySummary>,
  registry: &[AssetId],
) -> Vec<AssetReliabilitySummary> {
  let mut by_asset: BTreeMap<AssetId, AssetReliabilitySummary> =
    summaries.into_iter().map(|s| (s.asset_id, s)).collect();
  for &asset_id in registry {
    by_asset
      .entry(asset_id)
      .or_insert_with(|| AssetReliabilitySummary::empty(asset_id));
  }
  by_asset.into_values().collect()
}
