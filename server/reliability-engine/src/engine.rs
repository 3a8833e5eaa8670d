//! Core engine: reads a snapshot, runs the pipeline, hands rows to a materializer.

use tracing::{debug, info, warn};

use crate::aggregate;
use crate::config::Config;
use crate::error::EngineError;
use crate::interval;
use crate::materialize::Materializer;
use crate::merge;
use crate::store::EventStore;
use crate::types::{AssetReliabilitySummary, MaterializeReport};

/// The reliability metrics engine. Stateless across runs: every call recomputes
/// from the store's current snapshot.
#[derive(Debug, Clone)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  /// Compute one summary per asset that produced at least one event.
  ///
  /// Returns `EngineError::NoData` when the failure source is empty.
  pub fn compute(&self, store: &dyn EventStore) -> Result<Vec<AssetReliabilitySummary>, EngineError> {
    let failures = store.list_failures()?;
    if failures.is_empty() {
      warn!("failure source is empty; refusing to compute");
      return Err(EngineError::NoData);
    }
    let maintenance = store.list_maintenance_events()?;

    let merged = merge::merge(&failures, &maintenance);
    let intervals = interval::compute_intervals(&merged);
    let summaries = aggregate::aggregate(&intervals);
    debug!(
      failures = failures.len(),
      maintenance = maintenance.len(),
      merged = merged.len(),
      assets = summaries.len(),
      "pipeline finished"
    );
    Ok(summaries)
  }

  /// `compute`, then the registry left-join when `full_fleet` is configured.
  pub fn summarize(&self, store: &dyn EventStore) -> Result<Vec<AssetReliabilitySummary>, EngineError> {
    let summaries = self.compute(store)?;
    if !self.config.full_fleet {
      return Ok(summaries);
    }
    let registry = store.list_assets()?;
    Ok(aggregate::with_fleet(summaries, &registry))
  }

  /// Everything a materializer needs for one run: target table and rows.
  ///
  /// Shared by the sync `refresh` below and by async materializers that cannot
  /// implement `Materializer`. Fails before any write when there is nothing to publish.
  pub fn prepare(&self, store: &dyn EventStore) -> Result<Publication, EngineError> {
    let rows = self.summarize(store)?;
    Ok(Publication {
      table: self.config.table_name.clone(),
      rows,
    })
  }

  /// Recompute and replace the configured artifact.
  ///
  /// The materializer is not called unless a summary set was computed.
  pub fn refresh<M>(
    &self,
    store: &dyn EventStore,
    materializer: &mut M,
  ) -> Result<MaterializeReport, EngineError>
  where
    M: Materializer + ?Sized,
  {
    let publication = self.prepare(store)?;
    let report = materializer.replace(&publication.table, &publication.rows)?;
    log_report(&report);
    Ok(report)
  }
}

/// A computed summary set bound to the table it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
  pub table: String,
  pub rows: Vec<AssetReliabilitySummary>,
}

/// Completion log line, identical for every materializer.
pub fn log_report(report: &MaterializeReport) {
  info!(
    table = %report.table,
    rows = report.rows,
    digest = %report.digest,
    "reliability metrics refreshed"
  );
}
