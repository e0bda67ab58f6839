// tests/command_executor.rs

mod common;
use crate::common::init_tracing;

use std::collections::BTreeMap;

use sqlbranch::branch::Value;
use sqlbranch::config::{CellTypes, ConnectionConfig};
use sqlbranch::errors::SqlBranchError;
use sqlbranch::exec::command::{build_args, build_dry_run_args};
use sqlbranch::exec::{CommandQueryExecutor, QueryExecutor, QueryRequest};
use sqlbranch::types::SqlDialect;

fn request(connection_id: &str) -> QueryRequest {
    QueryRequest {
        sql: "select count(*) from ds.t".to_string(),
        dialect: SqlDialect::Standard,
        connection_id: connection_id.to_string(),
        delegate_to: None,
    }
}

/// A connection whose "client" is a shell script; the query arguments end up
/// as positional parameters and are ignored. Cells keep their JSON types.
fn shell_connection(script: &str) -> ConnectionConfig {
    ConnectionConfig {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string(), "fake-bq".to_string()],
        cell_types: CellTypes::Json,
    }
}

/// A shell "client" that answers a dry run with `schema_fields` and the query
/// itself with `rows`, typing cells from the schema.
fn schema_connection(schema_fields: &str, rows: &str) -> ConnectionConfig {
    let script = format!(
        r#"case " $* " in *" --dry_run "*) echo '{{"statistics":{{"query":{{"schema":{{"fields":{schema_fields}}}}}}}}}' ;; *) echo '{rows}' ;; esac"#
    );
    ConnectionConfig {
        cell_types: CellTypes::Schema,
        ..shell_connection(&script)
    }
}

fn executor(conn: ConnectionConfig) -> CommandQueryExecutor {
    let mut connections = BTreeMap::new();
    connections.insert("test".to_string(), conn);
    CommandQueryExecutor::new(connections)
}

#[test]
fn args_follow_the_client_convention() {
    let conn = ConnectionConfig {
        args: vec!["--project_id=p".to_string()],
        ..ConnectionConfig::default()
    };
    let mut req = request("test");
    req.delegate_to = Some("svc@example.iam".to_string());

    assert_eq!(
        build_args(&conn, &req),
        vec![
            "--project_id=p",
            "--quiet",
            "--impersonate_service_account=svc@example.iam",
            "query",
            "--format=json",
            "--max_rows=1",
            "--use_legacy_sql=false",
            "--",
            "select count(*) from ds.t",
        ]
    );

    let dry_run = build_dry_run_args(&conn, &req);
    assert!(dry_run.contains(&"--dry_run".to_string()));
    assert!(!dry_run.iter().any(|a| a.starts_with("--max_rows")));
    assert_eq!(&dry_run[dry_run.len() - 2..], &["--", "select count(*) from ds.t"]);
}

#[test]
fn sql_with_a_leading_comment_follows_the_separator() {
    let mut req = request("test");
    req.sql = "-- freshness check\nselect count(*) from ds.t".to_string();

    let args = build_args(&ConnectionConfig::default(), &req);
    let sep = args.iter().position(|a| a == "--").expect("separator present");
    assert_eq!(args[sep + 1], req.sql);
    assert_eq!(sep + 2, args.len());
}

#[test]
fn legacy_dialect_sets_the_flag() {
    let mut req = request("test");
    req.dialect = SqlDialect::Legacy;
    let args = build_args(&ConnectionConfig::default(), &req);
    assert!(args.contains(&"--use_legacy_sql=true".to_string()));
    assert!(!args.iter().any(|a| a.starts_with("--impersonate")));
}

#[cfg(unix)]
#[tokio::test]
async fn first_row_is_read_from_client_stdout() {
    init_tracing();
    let mut exec = executor(shell_connection(r#"echo '[{"f0_": 3}]'"#));

    let row = exec.run_first(request("test")).await.unwrap().unwrap();
    assert_eq!(row.values(), &[Value::Int(3)]);
}

#[cfg(unix)]
#[tokio::test]
async fn cells_are_typed_from_the_dry_run_schema() {
    init_tracing();
    let mut exec = executor(schema_connection(
        r#"[{"name":"f0_","type":"INTEGER"},{"name":"status","type":"STRING"}]"#,
        r#"[{"f0_":"0","status":"0"}]"#,
    ));

    let row = exec.run_first(request("test")).await.unwrap().unwrap();
    assert_eq!(row.values(), &[Value::Int(0), Value::Text("0".into())]);
}

#[cfg(unix)]
#[tokio::test]
async fn dry_run_without_schema_is_a_query_failure() {
    init_tracing();
    let mut exec = executor(ConnectionConfig {
        cell_types: CellTypes::Schema,
        ..shell_connection("echo '{}'")
    });

    match exec.run_first(request("test")).await {
        Err(SqlBranchError::QueryFailed { message, .. }) => {
            assert!(message.contains("schema"), "message: {message}");
        }
        other => panic!("Expected QueryFailed, got: {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn empty_result_is_no_rows() {
    init_tracing();
    let mut exec = executor(shell_connection("echo '[]'"));

    assert_eq!(exec.run_first(request("test")).await.unwrap(), None);
}

#[cfg(unix)]
#[tokio::test]
async fn non_zero_exit_is_a_query_failure() {
    init_tracing();
    let mut exec = executor(shell_connection("echo 'Access Denied' >&2; exit 2"));

    match exec.run_first(request("test")).await {
        Err(SqlBranchError::QueryFailed { connection_id, message }) => {
            assert_eq!(connection_id, "test");
            assert!(message.contains("Access Denied"));
            assert!(message.contains('2'));
        }
        other => panic!("Expected QueryFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_connection_is_a_config_error() {
    init_tracing();
    let mut exec = executor(ConnectionConfig::default());

    match exec.run_first(request("elsewhere")).await {
        Err(SqlBranchError::ConfigError(msg)) => assert!(msg.contains("elsewhere")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[tokio::test]
async fn missing_program_surfaces_as_error() {
    init_tracing();
    let mut exec = executor(ConnectionConfig {
        program: "definitely-not-a-real-warehouse-client".to_string(),
        ..ConnectionConfig::default()
    });

    assert!(exec.run_first(request("test")).await.is_err());
}
