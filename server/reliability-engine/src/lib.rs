//! Reliability Metrics Engine: deterministic MTBF / MTTR computation.
//!
//! Merges failure and maintenance events per asset, computes the time since each
//! asset's previous event, averages those intervals per kind, and replaces the
//! `reliability_stats` artifact in one all-or-nothing step.
//!
//! Full refresh on every run; nothing is carried between invocations.

pub mod aggregate;
pub mod config;
pub mod csv_store;
pub mod engine;
pub mod error;
pub mod interval;
pub mod materialize;
pub mod merge;
pub mod normalize;
pub mod store;
pub mod types;

pub use config::Config;
pub use csv_store::CsvEventStore;
pub use engine::{Engine, Publication};
pub use error::EngineError;
pub use materialize::{CsvMaterializer, Materializer, MemoryMaterializer};
pub use store::{EventStore, MemoryStore};
pub use types::{AssetReliabilitySummary, FailureEvent, MaintenanceEvent, MaterializeReport};
