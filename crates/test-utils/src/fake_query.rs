use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sqlbranch::branch::ResultRow;
use sqlbranch::errors::{Result, SqlBranchError};
use sqlbranch::exec::{QueryExecutor, QueryRequest};

/// What the fake returns for a given SQL string.
#[derive(Debug, Clone)]
pub enum CannedResult {
    Row(ResultRow),
    NoRows,
    Error(String),
}

/// A fake query backend that:
/// - records every request it receives
/// - answers from a table of canned results keyed by SQL text
///
/// SQL without a canned result is answered with `NoRows`.
#[derive(Debug, Clone, Default)]
pub struct FakeQueryExecutor {
    results: HashMap<String, CannedResult>,
    requests: Arc<Mutex<Vec<QueryRequest>>>,
}

impl FakeQueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, sql: &str, row: ResultRow) -> Self {
        self.results.insert(sql.to_string(), CannedResult::Row(row));
        self
    }

    pub fn with_no_rows(mut self, sql: &str) -> Self {
        self.results.insert(sql.to_string(), CannedResult::NoRows);
        self
    }

    pub fn with_error(mut self, sql: &str, message: &str) -> Self {
        self.results
            .insert(sql.to_string(), CannedResult::Error(message.to_string()));
        self
    }

    /// Shared handle to the recorded requests.
    pub fn requests(&self) -> Arc<Mutex<Vec<QueryRequest>>> {
        Arc::clone(&self.requests)
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.sql.clone())
            .collect()
    }
}

impl QueryExecutor for FakeQueryExecutor {
    fn run_first(
        &mut self,
        request: QueryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<ResultRow>>> + Send + '_>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());

            match self.results.get(&request.sql) {
                Some(CannedResult::Row(row)) => Ok(Some(row.clone())),
                Some(CannedResult::NoRows) | None => Ok(None),
                Some(CannedResult::Error(message)) => Err(SqlBranchError::QueryFailed {
                    connection_id: request.connection_id.clone(),
                    message: message.clone(),
                }),
            }
        })
    }
}
