//! Engine configuration with sane defaults.

/// Settings for one engine invocation. Passed explicitly into every stage.
#[derive(Debug, Clone)]
pub struct Config {
  /// Name of the materialized artifact read by reporting layers.
  pub table_name: String,
  /// Database schema holding the source tables and the artifact.
  pub schema: String,
  /// `chrono` format for naive timestamps in CSV exports.
  pub timestamp_format: String,
  /// Treat a missing maintenance export as an empty collection.
  pub allow_missing_maintenance: bool,
  /// Left-join the asset registry and emit zero rows for idle assets.
  pub full_fleet: bool,
  /// Rows per INSERT statement when materializing into a database.
  pub insert_batch_size: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      table_name: "reliability_stats".into(),
      schema: "maintenance".into(),
      timestamp_format: "%Y-%m-%d %H:%M:%S".into(),
      allow_missing_maintenance: false,
      full_fleet: false,
      insert_batch_size: 500,
    }
  }
}
