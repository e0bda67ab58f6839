// src/config/mod.rs

//! Configuration loading and validation for sqlbranch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and resolve `sql_file` references
//!   (`loader.rs`).
//! - Validate branch settings and DAG correctness (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_sql_files};
pub use model::{
    BranchConfig, CellTypes, ConfigFile, ConfigSection, ConnectionConfig, DEFAULT_CONNECTION_ID,
    RawConfigFile, TaskConfig,
};
