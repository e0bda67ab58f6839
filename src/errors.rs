// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlBranchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Query failed on connection '{connection_id}': {message}")]
    QueryFailed {
        connection_id: String,
        message: String,
    },

    #[error("Unreadable query output: {0}")]
    QueryOutput(#[from] serde_json::Error),

    #[error("Skip request failed for run '{run_id}': {message}")]
    SkipFailed { run_id: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SqlBranchError>;
