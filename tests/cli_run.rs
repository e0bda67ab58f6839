// tests/cli_run.rs

mod common;
use crate::common::init_tracing;

use std::fs;

use chrono::{TimeZone, Utc};
use clap::Parser;
use sqlbranch::cli::CliArgs;
use sqlbranch::{default_run_id, parse_execution_date, run};
use tempfile::TempDir;

#[test]
fn execution_date_is_parsed_as_rfc3339() {
    let dt = parse_execution_date(Some("2024-03-01T12:00:00+02:00")).unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    assert!(parse_execution_date(Some("yesterday")).is_err());
}

#[test]
fn manual_run_id_embeds_the_timestamp() {
    let dt = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    assert_eq!(default_run_id(dt), "manual__2024-03-01T10:00:00+00:00");
}

#[test]
fn cli_defaults() {
    let args = CliArgs::parse_from(["sqlbranch"]);
    assert_eq!(args.config, "Branch.toml");
    assert!(args.task.is_none());
    assert!(!args.dry_run);

    let args = CliArgs::parse_from([
        "sqlbranch",
        "--config",
        "x.toml",
        "--task",
        "check",
        "--log-level",
        "debug",
        "--dry-run",
    ]);
    assert_eq!(args.config, "x.toml");
    assert_eq!(args.task.as_deref(), Some("check"));
    assert!(args.dry_run);
}

#[tokio::test]
async fn dry_run_does_not_query() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("Branch.toml");
    fs::write(
        &config,
        r#"
[connection.bigquery_default]
program = "definitely-not-a-real-warehouse-client"

[branch.check]
sql = "select 1"
pass_task = "a"
fail_task = "b"
"#,
    )
    .unwrap();

    let args = CliArgs::parse_from(["sqlbranch", "--dry-run", "--config", config.to_str().unwrap()]);
    run(args).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn end_to_end_with_shell_client() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("Branch.toml");
    fs::write(
        &config,
        r#"
[connection.fake]
program = "sh"
args = ["-c", "echo '[{\"f0_\": 0}]'", "fake-bq"]
cell_types = "json"

[branch.check]
sql = "select count(*) from ds.t"
pass_task = "load"
fail_task = "alert"
connection_id = "fake"

[task.load]
after = ["check"]

[task.alert]
after = ["check"]
"#,
    )
    .unwrap();

    let args = CliArgs::parse_from([
        "sqlbranch",
        "--config",
        config.to_str().unwrap(),
        "--run-id",
        "manual__test",
        "--execution-date",
        "2024-03-01T00:00:00Z",
    ]);
    run(args).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn end_to_end_query_failure_is_reported() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("Branch.toml");
    fs::write(
        &config,
        r#"
[connection.fake]
program = "sh"
args = ["-c", "exit 1", "fake-bq"]

[branch.check]
sql = "select 1"
pass_task = "a"
fail_task = "b"
connection_id = "fake"
"#,
    )
    .unwrap();

    let args = CliArgs::parse_from(["sqlbranch", "--config", config.to_str().unwrap()]);
    let err = run(args).await.unwrap_err();
    assert!(format!("{err:?}").contains("Query failed"));
}
