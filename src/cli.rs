// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sqlbranch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sqlbranch",
    version,
    about = "Pick a DAG branch from the first row of a SQL query and skip the other branches.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Branch.toml")]
    pub config: String,

    /// Evaluate only this branch operator.
    ///
    /// Without it, every `[branch.<name>]` runs in dependency order.
    #[arg(long, value_name = "NAME")]
    pub task: Option<String>,

    /// Identifier of the DAG run (default: `manual__<execution date>`).
    #[arg(long, value_name = "ID")]
    pub run_id: Option<String>,

    /// Logical execution timestamp, RFC 3339 (default: now).
    #[arg(long, value_name = "TIMESTAMP")]
    pub execution_date: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SQLBRANCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print branches and the DAG, but don't run any query.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
