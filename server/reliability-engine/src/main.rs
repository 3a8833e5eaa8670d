//! Binary entrypoint: CSV exports in, `<table>.csv` artifact out.
//!
//! On success one MaterializeReport JSON line is written to stdout. On failure an
//! ErrorOutput JSON line is written and the process exits non-zero (2 for "no data",
//! 1 otherwise). Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use reliability_engine::types::ErrorOutput;
use reliability_engine::{Config, CsvEventStore, CsvMaterializer, Engine, EngineError};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recompute per-asset MTBF/MTTR from CSV exports")]
struct Args {
  /// Directory holding PdM_failures.csv, PdM_maint.csv and PdM_machines.csv
  #[arg(long, env = "RELIABILITY_DATA_DIR", default_value = "data")]
  data_dir: PathBuf,

  /// Directory receiving the materialized artifact
  #[arg(long, env = "RELIABILITY_OUT_DIR", default_value = ".")]
  out_dir: PathBuf,

  /// Artifact name
  #[arg(long, env = "RELIABILITY_TABLE", default_value = "reliability_stats")]
  table: String,

  /// chrono format of the `datetime` column
  #[arg(long, env = "RELIABILITY_TIMESTAMP_FORMAT")]
  timestamp_format: Option<String>,

  /// Emit zero rows for registry assets without events
  #[arg(long)]
  full_fleet: bool,

  /// Treat a missing PdM_maint.csv as empty
  #[arg(long)]
  allow_missing_maintenance: bool,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();
  let defaults = Config::default();
  let config = Config {
    table_name: args.table,
    timestamp_format: args.timestamp_format.unwrap_or(defaults.timestamp_format.clone()),
    full_fleet: args.full_fleet,
    allow_missing_maintenance: args.allow_missing_maintenance,
    ..defaults
  };

  let store = CsvEventStore::new(args.data_dir, &config);
  let mut materializer = CsvMaterializer::new(args.out_dir);
  let engine = Engine::new(config);

  let stdout = io::stdout();
  let mut out = stdout.lock();
  match engine.refresh(&store, &mut materializer) {
    Ok(report) => {
      let _ = serde_json::to_writer(&mut out, &report);
      let _ = writeln!(out);
      ExitCode::SUCCESS
    }
    Err(e) => {
      let _ = writeln!(io::stderr(), "reliability-engine: {}", e);
      let _ = serde_json::to_writer(&mut out, &ErrorOutput::new(e.kind(), e.to_string()));
      let _ = writeln!(out);
      match e {
        EngineError::NoData => ExitCode::from(2),
        _ => ExitCode::FAILURE,
      }
    }
  }
}
