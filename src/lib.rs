// src/lib.rs

pub mod branch;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod operator;
pub mod types;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::DagRun;
use crate::engine::{BranchReport, run_branches};
use crate::exec::CommandQueryExecutor;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (including `sql_file` resolution)
/// - the task DAG and a fresh per-run state
/// - the command-line query backend
/// - the branch runner and its report on stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let execution_date = parse_execution_date(args.execution_date.as_deref())?;
    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(execution_date));

    let mut run = DagRun::new(cfg.graph(), run_id, execution_date);
    let mut executor = CommandQueryExecutor::new(cfg.connection.clone());

    info!(run_id = %run.run_id(), %execution_date, "starting branch run");

    let reports = run_branches(&cfg, &mut run, &mut executor, args.task.as_deref()).await?;

    print_report(&reports, &run);
    Ok(())
}

/// Parse `--execution-date`, defaulting to now.
pub fn parse_execution_date(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("invalid --execution-date '{s}' (expected RFC 3339)")),
    }
}

/// Run id for runs started by hand: `manual__<RFC 3339 timestamp>`.
pub fn default_run_id(execution_date: DateTime<Utc>) -> String {
    format!("manual__{}", execution_date.to_rfc3339())
}

fn print_report(reports: &[BranchReport], run: &DagRun) {
    println!("run {}", run.run_id());
    for report in reports {
        match report {
            BranchReport::Evaluated { task_id, outcome } => {
                let row = outcome
                    .row
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "<no rows>".to_string());
                println!(
                    "  {task_id}: row {row} -> follow {} (skipped: {:?})",
                    outcome.decision.task_id(),
                    outcome.skipped
                );
            }
            BranchReport::Skipped { task_id } => {
                println!("  {task_id}: skipped");
            }
        }
    }

    println!();
    println!("task states:");
    for (task, state) in run.states() {
        println!("  {task:<24} {state}");
    }
}

/// Simple dry-run output: print branches, their queries and plain tasks.
fn print_dry_run(cfg: &ConfigFile) {
    println!("sqlbranch dry-run");
    if !cfg.config.sql_search_path.is_empty() {
        println!("  config.sql_search_path = {:?}", cfg.config.sql_search_path);
    }
    println!();

    println!("connections ({}):", cfg.connection.len());
    for (id, conn) in cfg.connection.iter() {
        println!("  - {id}: {} {:?}", conn.program, conn.args);
    }
    println!();

    println!("branches ({}):", cfg.branch.len());
    for (name, branch) in cfg.branch.iter() {
        println!("  - {name}");
        if let Some(ref sql) = branch.sql {
            println!("      sql: {}", sql.trim());
        }
        println!("      pass_task: {}", branch.pass_task.as_deref().unwrap_or(""));
        println!("      fail_task: {}", branch.fail_task.as_deref().unwrap_or(""));
        println!("      dialect: {}", branch.dialect());
        println!("      connection_id: {}", branch.connection_id);
        if let Some(ref delegate) = branch.delegate_to {
            println!("      delegate_to: {delegate}");
        }
        if !branch.after.is_empty() {
            println!("      after: {:?}", branch.after);
        }
    }

    if !cfg.task.is_empty() {
        println!();
        println!("tasks ({}):", cfg.task.len());
        for (name, task) in cfg.task.iter() {
            if task.after.is_empty() {
                println!("  - {name}");
            } else {
                println!("  - {name} (after: {:?})", task.after);
            }
        }
    }

    debug!("dry-run complete (no query executed)");
}
