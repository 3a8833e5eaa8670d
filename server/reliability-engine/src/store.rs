//! Event store adapter seam: read-only snapshots of the source collections.

use crate::error::EngineError;
use crate::types::{AssetId, FailureEvent, MaintenanceEvent};

/// Read access to failures, maintenance actions and the asset registry.
///
/// Each call returns a complete snapshot. Retry and timeout policy belong to the
/// implementation; the engine surfaces errors unchanged.
pub trait EventStore {
  fn list_failures(&self) -> Result<Vec<FailureEvent>, EngineError>;

  fn list_maintenance_events(&self) -> Result<Vec<MaintenanceEvent>, EngineError>;

  fn list_assets(&self) -> Result<Vec<AssetId>, EngineError>;
}

/// In-memory snapshot. Also the hand-off type once an async source has been drained.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  pub failures: Vec<FailureEvent>,
  pub maintenance: Vec<MaintenanceEvent>,
  pub assets: Vec<AssetId>,
}

impl MemoryStore {
  pub fn new(failures: Vec<FailureEvent>, maintenance: Vec<MaintenanceEvent>) -> Self {
    Self {
      failures,
      maintenance,
      assets: Vec::new(),
    }
  }

  pub fn with_assets(mut self, assets: Vec<AssetId>) -> Self {
    self.assets = assets;
    self
  }
}

impl EventStore for MemoryStore {
  fn list_failures(&self) -> Result<Vec<FailureEvent>, EngineError> {
    Ok(self.failures.clone())
  }

  fn list_maintenance_events(&self) -> Result<Vec<MaintenanceEvent>, EngineError> {
    Ok(self.maintenance.clone())
  }

  fn list_assets(&self) -> Result<Vec<AssetId>, EngineError> {
    Ok(self.assets.clone())
  }
}
