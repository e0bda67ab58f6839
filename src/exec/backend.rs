// src/exec/backend.rs

//! Pluggable query backend abstraction.
//!
//! The operator talks to a `QueryExecutor` instead of a concrete warehouse
//! client. Production code uses [`CommandQueryExecutor`]; tests provide
//! their own implementation that returns fixed rows and records requests.
//!
//! [`CommandQueryExecutor`]: crate::exec::CommandQueryExecutor

use std::future::Future;
use std::pin::Pin;

use crate::branch::ResultRow;
use crate::errors::Result;
use crate::types::SqlDialect;

/// Everything the warehouse needs to run one branch query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub sql: String,
    pub dialect: SqlDialect,
    pub connection_id: String,
    /// Identity to impersonate, if any.
    pub delegate_to: Option<String>,
}

/// Trait abstracting how a query is executed.
pub trait QueryExecutor: Send {
    /// Run the query and return its first row, or `None` when it produced no
    /// rows.
    ///
    /// Failures (connectivity, malformed SQL, auth) are returned as errors
    /// and must not be mapped to `None`.
    fn run_first(
        &mut self,
        request: QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<ResultRow>>> + Send + '_>>;
}
