//! Binary entrypoint for the reliability metrics sync.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use reliability_engine::types::ErrorOutput;
use reliability_engine::Config;
use reliability_sync::{SyncError, SyncSession};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recompute reliability_stats in PostgreSQL")]
struct Args {
  /// Postgres connection string
  #[arg(long, env = "DATABASE_URL")]
  database_url: String,

  /// Schema holding the source tables and the artifact
  #[arg(long, env = "DB_SCHEMA", default_value = "maintenance")]
  schema: String,

  /// Artifact table name
  #[arg(long, env = "RELIABILITY_TABLE", default_value = "reliability_stats")]
  table: String,

  /// Rows per INSERT statement
  #[arg(long, env = "RELIABILITY_BATCH_SIZE", default_value_t = 500)]
  batch_size: usize,

  /// Emit zero rows for machines without events
  #[arg(long)]
  full_fleet: bool,
}

async fn run(args: Args) -> Result<reliability_engine::MaterializeReport, SyncError> {
  let config = Config {
    schema: args.schema,
    table_name: args.table,
    insert_batch_size: args.batch_size,
    full_fleet: args.full_fleet,
    ..Config::default()
  };
  let session = SyncSession::connect(&args.database_url, config).await?;
  session.refresh().await
}

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();
  let result = run(args).await;

  let stdout = io::stdout();
  let mut out = stdout.lock();
  match result {
    Ok(report) => {
      let _ = serde_json::to_writer(&mut out, &report);
      let _ = writeln!(out);
      ExitCode::SUCCESS
    }
    Err(e) => {
      let _ = writeln!(io::stderr(), "reliability-sync: {}", e);
      let _ = serde_json::to_writer(&mut out, &ErrorOutput::new(e.kind(), e.to_string()));
      let _ = writeln!(out);
      if e.is_no_data() {
        ExitCode::from(2)
      } else {
        ExitCode::FAILURE
      }
    }
  }
}
