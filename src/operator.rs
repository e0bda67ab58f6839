// src/operator.rs

//! The branch operator: run one query, pick a branch, skip the rest.
//!
//! The operator owns no IO of its own. The warehouse is reached through a
//! [`QueryExecutor`] and skips are reported through a [`SkipScheduler`], both
//! passed in per execution.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::branch::{BranchDecision, ResultRow, decide, skip_set};
use crate::config::model::{BranchConfig, DEFAULT_CONNECTION_ID};
use crate::dag::SkipScheduler;
use crate::errors::{Result, SqlBranchError};
use crate::exec::{QueryExecutor, QueryRequest};
use crate::types::{SqlDialect, TaskId};

/// Per-execution context supplied by the host.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task_id: TaskId,
    pub run_id: String,
    pub execution_date: DateTime<Utc>,
    /// Ids of the tasks immediately downstream of this one.
    pub downstream: Vec<TaskId>,
}

/// What one execution decided.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchOutcome {
    pub decision: BranchDecision,
    /// Tasks handed to the skip port (empty when no call was made).
    pub skipped: Vec<TaskId>,
    /// The row the decision was based on.
    pub row: Option<ResultRow>,
}

/// A configured branch operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOperator {
    task_id: TaskId,
    sql: String,
    pass_task: TaskId,
    fail_task: TaskId,
    dialect: SqlDialect,
    connection_id: String,
    delegate_to: Option<String>,
}

impl BranchOperator {
    /// Create an operator with the default dialect (legacy) and connection.
    ///
    /// Fails with a [`SqlBranchError::ConfigError`] when the SQL or either
    /// target task id is blank.
    pub fn new(
        task_id: impl Into<TaskId>,
        sql: impl Into<String>,
        pass_task: impl Into<TaskId>,
        fail_task: impl Into<TaskId>,
    ) -> Result<Self> {
        let task_id = task_id.into();
        let sql = sql.into();
        let pass_task = pass_task.into();
        let fail_task = fail_task.into();

        if sql.trim().is_empty() {
            return Err(SqlBranchError::ConfigError(format!(
                "branch '{task_id}' has an empty query"
            )));
        }
        for (field, value) in [("pass_task", &pass_task), ("fail_task", &fail_task)] {
            if value.trim().is_empty() {
                return Err(SqlBranchError::ConfigError(format!(
                    "branch '{task_id}' has an empty `{field}`"
                )));
            }
        }
        if pass_task == fail_task {
            warn!(task = %task_id, branch = %pass_task, "pass and fail branches are the same task");
        }

        Ok(Self {
            task_id,
            sql,
            pass_task,
            fail_task,
            dialect: SqlDialect::default(),
            connection_id: DEFAULT_CONNECTION_ID.to_string(),
            delegate_to: None,
        })
    }

    /// Build from a `[branch.<task_id>]` section whose `sql_file` has already
    /// been resolved (see [`crate::config::resolve_sql_files`]).
    pub fn from_config(task_id: &str, cfg: &BranchConfig) -> Result<Self> {
        let sql = match (&cfg.sql, &cfg.sql_file) {
            (Some(sql), _) => sql.clone(),
            (None, Some(file)) => {
                return Err(SqlBranchError::ConfigError(format!(
                    "branch '{task_id}': sql_file '{file}' was not loaded"
                )));
            }
            (None, None) => String::new(),
        };
        let missing = |field: &str| {
            SqlBranchError::ConfigError(format!("branch '{task_id}' is missing `{field}`"))
        };
        let pass_task = cfg.pass_task.clone().ok_or_else(|| missing("pass_task"))?;
        let fail_task = cfg.fail_task.clone().ok_or_else(|| missing("fail_task"))?;

        Ok(Self::new(task_id, sql, pass_task, fail_task)?
            .with_dialect(cfg.dialect())
            .with_connection_id(cfg.connection_id.clone())
            .with_delegate_to(cfg.delegate_to.clone()))
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_connection_id(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = connection_id.into();
        self
    }

    pub fn with_delegate_to(mut self, delegate_to: Option<String>) -> Self {
        self.delegate_to = delegate_to;
        self
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn pass_task(&self) -> &str {
        &self.pass_task
    }

    pub fn fail_task(&self) -> &str {
        &self.fail_task
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn delegate_to(&self) -> Option<&str> {
        self.delegate_to.as_deref()
    }

    /// The request this operator sends to the query port.
    pub fn query_request(&self) -> QueryRequest {
        QueryRequest {
            sql: self.sql.clone(),
            dialect: self.dialect,
            connection_id: self.connection_id.clone(),
            delegate_to: self.delegate_to.clone(),
        }
    }

    /// Run the query, choose a branch and skip every other downstream task.
    ///
    /// Query errors are returned unchanged; nothing is skipped in that case.
    pub async fn execute<Q, S>(
        &self,
        ctx: &TaskContext,
        query: &mut Q,
        scheduler: &mut S,
    ) -> Result<BranchOutcome>
    where
        Q: QueryExecutor + ?Sized,
        S: SkipScheduler + ?Sized,
    {
        info!(task = %self.task_id, run_id = %ctx.run_id, sql = %self.sql, "executing SQL check");

        let row = query.run_first(self.query_request()).await?;

        match row {
            None => info!(task = %self.task_id, "the query returned no rows"),
            Some(ref r) => info!(task = %self.task_id, record = %r, "record"),
        }

        let decision = decide(row.as_ref(), &self.pass_task, &self.fail_task);
        if !decision.is_pass() {
            if let Some(ref r) = row {
                info!(
                    task = %self.task_id,
                    query = %self.sql,
                    results = %r,
                    "check failed: not every column is truthy"
                );
            }
        }

        info!(task = %self.task_id, branch = %decision.task_id(), "following branch");
        info!(task = %self.task_id, downstream = ?ctx.downstream, "downstream task ids");

        let skipped = if ctx.downstream.is_empty() {
            Vec::new()
        } else {
            let skip = skip_set(&ctx.downstream, &decision);
            scheduler
                .skip(&ctx.run_id, ctx.execution_date, &skip)
                .await?;
            skip
        };

        Ok(BranchOutcome {
            decision,
            skipped,
            row,
        })
    }
}
