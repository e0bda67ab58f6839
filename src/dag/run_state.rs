// src/dag/run_state.rs

//! Per-run task state for the local host.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::dag::graph::DagGraph;
use crate::dag::skipper::SkipScheduler;
use crate::errors::{Result, SqlBranchError};
use crate::types::{TaskId, TaskState};

/// State of every task in one DAG run.
///
/// All tasks start `Pending`. Branch operators move themselves to `Success`
/// and their non-followed downstream tasks to `Skipped` through the
/// [`SkipScheduler`] impl.
#[derive(Debug, Clone)]
pub struct DagRun {
    run_id: String,
    execution_date: DateTime<Utc>,
    states: BTreeMap<TaskId, TaskState>,
}

impl DagRun {
    pub fn new(graph: &DagGraph, run_id: impl Into<String>, execution_date: DateTime<Utc>) -> Self {
        let states = graph
            .tasks()
            .map(|t| (t.to_string(), TaskState::Pending))
            .collect();
        Self {
            run_id: run_id.into(),
            execution_date,
            states,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn execution_date(&self) -> DateTime<Utc> {
        self.execution_date
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    /// All task states, ordered by task id.
    pub fn states(&self) -> impl Iterator<Item = (&str, TaskState)> {
        self.states.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn mark_success(&mut self, task: &str) -> Result<()> {
        self.set_state(task, TaskState::Success)
    }

    /// Mark tasks as skipped. Already-skipped tasks stay skipped; a task that
    /// already succeeded is left alone.
    pub fn mark_skipped<'t>(&mut self, tasks: impl IntoIterator<Item = &'t TaskId>) -> Result<()> {
        for task in tasks {
            match self.state_of(task) {
                Some(TaskState::Success) => {
                    warn!(task = %task, run_id = %self.run_id, "not skipping task that already succeeded");
                }
                Some(_) => {
                    self.set_state(task, TaskState::Skipped)?;
                }
                None => return Err(SqlBranchError::TaskNotFound(task.clone())),
            }
        }
        Ok(())
    }

    fn set_state(&mut self, task: &str, state: TaskState) -> Result<()> {
        let slot = self
            .states
            .get_mut(task)
            .ok_or_else(|| SqlBranchError::TaskNotFound(task.to_string()))?;
        debug!(task = %task, from = %slot, to = %state, "task state change");
        *slot = state;
        Ok(())
    }
}

impl SkipScheduler for DagRun {
    fn skip<'a>(
        &'a mut self,
        run_id: &'a str,
        _execution_date: DateTime<Utc>,
        tasks: &'a [TaskId],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if run_id != self.run_id {
                return Err(SqlBranchError::SkipFailed {
                    run_id: run_id.to_string(),
                    message: format!("this host only tracks run '{}'", self.run_id),
                });
            }
            self.mark_skipped(tasks)
        })
    }
}
