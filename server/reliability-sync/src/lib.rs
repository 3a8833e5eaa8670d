//! Reliability metrics sync for the PostgreSQL maintenance database.
//!
//! Reads the `failures`, `maint` and `machines` tables, runs the reliability
//! engine, and replaces the `reliability_stats` table transactionally.

mod error;
pub mod sink;
pub mod source;
pub mod sql;
mod state;

pub use error::SyncError;
pub use sink::PgMaterializer;
pub use source::PgEventStore;
pub use state::SyncSession;
