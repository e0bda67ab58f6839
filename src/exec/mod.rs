// src/exec/mod.rs

//! Query execution layer.
//!
//! The branch operator never talks to the warehouse directly; it goes through
//! the [`QueryExecutor`] port so tests can substitute canned rows.
//!
//! - [`backend`] provides the `QueryExecutor` trait and the `QueryRequest`
//!   handed to it.
//! - [`command`] is the production implementation: it shells out to the
//!   warehouse command-line client using `tokio::process::Command`.
//! - [`output`] turns the client's JSON output into a `ResultRow`.

pub mod backend;
pub mod command;
pub mod output;

pub use backend::{QueryExecutor, QueryRequest};
pub use command::CommandQueryExecutor;
