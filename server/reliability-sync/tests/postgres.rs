//! End-to-end refresh against a live database.
//!
//! Ignored by default. Run with `RELIABILITY_TEST_DATABASE_URL` set and `--ignored`;
//! each test uses its own schema.

use reliability_engine::Config;
use reliability_sync::SyncSession;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::Postgres;

fn database_url() -> String {
  std::env::var("RELIABILITY_TEST_DATABASE_URL")
    .expect("RELIABILITY_TEST_DATABASE_URL must point at a scratch database")
}

async fn seed(session: &SyncSession, failures: &[(i32, &str)], maint: &[(i32, &str)]) {
  let schema = &session.config.schema;
  let ddl = [
    format!(r#"DROP SCHEMA IF EXISTS "{}" CASCADE"#, schema),
    format!(r#"CREATE SCHEMA "{}""#, schema),
    format!(r#"CREATE TABLE "{}".failures ("machineID" INTEGER, datetime TIMESTAMP)"#, schema),
    format!(r#"CREATE TABLE "{}".maint ("machineID" INTEGER, datetime TIMESTAMP)"#, schema),
    format!(r#"CREATE TABLE "{}".machines ("machineID" INTEGER)"#, schema),
  ];
  for stmt in &ddl {
    query::<Postgres>(stmt).execute(&session.pool).await.unwrap();
  }
  for (table, rows) in [("failures", failures), ("maint", maint)] {
    let insert = format!(
      r#"INSERT INTO "{}".{} ("machineID", datetime) VALUES ($1, $2::timestamp)"#,
      schema, table
    );
    for (id, ts) in rows {
      query::<Postgres>(&insert)
        .bind(*id)
        .bind(*ts)
        .execute(&session.pool)
        .await
        .unwrap();
    }
  }
}

async fn read_stats(session: &SyncSession) -> Vec<(i32, f64, f64, i64)> {
  let stmt = format!(
    r#"SELECT "machineID", "MTBF_hours", "MTTR_hours", "total_failures" FROM "{}".reliability_stats ORDER BY "machineID""#,
    session.config.schema
  );
  query_as::<Postgres, (i32, f64, f64, i64)>(&stmt)
    .fetch_all(&session.pool)
    .await
    .unwrap()
}

async fn session(schema: &str) -> SyncSession {
  let url = database_url();
  let config = Config {
    schema: schema.into(),
    insert_batch_size: 1,
    ..Config::default()
  };
  SyncSession::connect(&url, config).await.unwrap()
}

#[tokio::test]
#[ignore = "needs RELIABILITY_TEST_DATABASE_URL"]
async fn refresh_replaces_table_contents() {
  let session = session("reliability_it_replace").await;
  seed(
    &session,
    &[
      (1, "2015-01-05 06:00:00"),
      (1, "2015-01-05 16:00:00"),
      (1, "2015-01-06 12:00:00"),
      (2, "2015-02-01 06:00:00"),
    ],
    &[(1, "2015-01-05 16:30:00")],
  )
  .await;

  let report = session.refresh().await.unwrap();
  assert_eq!(report.rows, 2);
  assert_eq!(
    read_stats(&session).await,
    vec![(1, 14.75, 0.5, 3), (2, 0.0, 0.0, 1)]
  );

  // Second run with fewer assets leaves no stale rows behind.
  for stmt in [
    r#"DELETE FROM "reliability_it_replace".failures"#,
    r#"DELETE FROM "reliability_it_replace".maint"#,
    r#"INSERT INTO "reliability_it_replace".failures VALUES (5, '2015-03-01 00:00:00')"#,
  ] {
    query::<Postgres>(stmt).execute(&session.pool).await.unwrap();
  }
  session.refresh().await.unwrap();
  assert_eq!(read_stats(&session).await, vec![(5, 0.0, 0.0, 1)]);
}

#[tokio::test]
#[ignore = "needs RELIABILITY_TEST_DATABASE_URL"]
async fn empty_failures_do_not_touch_existing_table() {
  let session = session("reliability_it_nodata").await;
  seed(&session, &[(3, "2015-01-01 00:00:00")], &[]).await;
  session.refresh().await.unwrap();

  query::<Postgres>(r#"DELETE FROM "reliability_it_nodata".failures"#)
    .execute(&session.pool)
    .await
    .unwrap();
  let err = session.refresh().await.unwrap_err();
  assert!(err.is_no_data());
  assert_eq!(read_stats(&session).await, vec![(3, 0.0, 0.0, 1)]);
}
