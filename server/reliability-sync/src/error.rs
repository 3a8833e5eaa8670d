//! Error type for the sync service.

use reliability_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  /// Connection bootstrap failed before any run started.
  #[error("database: {0}")]
  Database(sqlx_core::Error),
}

impl SyncError {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Engine(e) => e.kind(),
      Self::Database(_) => "database",
    }
  }

  pub fn is_no_data(&self) -> bool {
    matches!(self, Self::Engine(EngineError::NoData))
  }
}
