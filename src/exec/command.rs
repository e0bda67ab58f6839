// src/exec/command.rs

//! Production query backend: runs the warehouse command-line client.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::branch::ResultRow;
use crate::config::model::{CellTypes, ConnectionConfig};
use crate::errors::{Result, SqlBranchError};
use crate::exec::backend::{QueryExecutor, QueryRequest};
use crate::exec::output::{parse_dry_run_schema, parse_first_row};

/// Query executor that spawns the client once or twice per query.
///
/// For a request on connection `c` the query process is
///
/// ```text
/// <c.program> <c.args..> --quiet [--impersonate_service_account=<delegate>]
///     query --format=json --max_rows=1 --use_legacy_sql=<bool> -- <sql>
/// ```
///
/// With `cell_types = "schema"` (the default) the same command is first run
/// with `--dry_run` in place of `--max_rows=1` to learn the result schema,
/// which types the string cells of the returned row.
///
/// A non-zero exit status is reported as [`SqlBranchError::QueryFailed`]
/// with the client's stderr.
#[derive(Debug, Clone)]
pub struct CommandQueryExecutor {
    connections: BTreeMap<String, ConnectionConfig>,
}

impl CommandQueryExecutor {
    pub fn new(connections: BTreeMap<String, ConnectionConfig>) -> Self {
        Self { connections }
    }

    fn connection(&self, id: &str) -> Result<&ConnectionConfig> {
        self.connections
            .get(id)
            .ok_or_else(|| SqlBranchError::ConfigError(format!("unknown connection_id '{id}'")))
    }
}

/// Argument list of the query invocation for `request`.
pub fn build_args(conn: &ConnectionConfig, request: &QueryRequest) -> Vec<String> {
    client_args(conn, request, "--max_rows=1")
}

/// Argument list of the schema dry run for `request`.
pub fn build_dry_run_args(conn: &ConnectionConfig, request: &QueryRequest) -> Vec<String> {
    client_args(conn, request, "--dry_run")
}

fn client_args(conn: &ConnectionConfig, request: &QueryRequest, mode: &str) -> Vec<String> {
    let mut args = conn.args.clone();
    args.push("--quiet".to_string());
    if let Some(ref delegate) = request.delegate_to {
        args.push(format!("--impersonate_service_account={delegate}"));
    }
    args.push("query".to_string());
    args.push("--format=json".to_string());
    args.push(mode.to_string());
    args.push(format!("--use_legacy_sql={}", request.dialect.is_legacy()));
    // SQL starting with `-- comment` must not be read as a flag.
    args.push("--".to_string());
    args.push(request.sql.clone());
    args
}

/// Run the client and return its stdout, mapping a non-zero exit to
/// `QueryFailed`.
async fn run_client(conn: &ConnectionConfig, connection_id: &str, args: &[String]) -> Result<String> {
    debug!(?args, "client arguments");

    let output = Command::new(&conn.program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("spawning query client '{}'", conn.program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(SqlBranchError::QueryFailed {
            connection_id: connection_id.to_string(),
            message: format!("client exited with {code}: {stderr}"),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

impl QueryExecutor for CommandQueryExecutor {
    fn run_first(
        &mut self,
        request: QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<ResultRow>>> + Send + '_>> {
        Box::pin(async move {
            let conn = self.connection(&request.connection_id)?;

            info!(
                connection = %request.connection_id,
                program = %conn.program,
                dialect = %request.dialect,
                "running query via warehouse client"
            );

            let schema = match conn.cell_types {
                CellTypes::Schema => {
                    let stdout =
                        run_client(conn, &request.connection_id, &build_dry_run_args(conn, &request))
                            .await?;
                    let fields = parse_dry_run_schema(&stdout).map_err(|err| {
                        SqlBranchError::QueryFailed {
                            connection_id: request.connection_id.clone(),
                            message: format!("reading result schema from dry run: {err}"),
                        }
                    })?;
                    debug!(columns = fields.len(), "result schema from dry run");
                    Some(fields)
                }
                CellTypes::Json => None,
            };

            let stdout = run_client(conn, &request.connection_id, &build_args(conn, &request)).await?;
            parse_first_row(&stdout, schema.as_deref())
        })
    }
}
