// src/engine/runner.rs

use tracing::{debug, info};

use crate::config::model::ConfigFile;
use crate::dag::{DagGraph, DagRun};
use crate::errors::{Result, SqlBranchError};
use crate::exec::QueryExecutor;
use crate::operator::{BranchOperator, BranchOutcome, TaskContext};
use crate::types::{TaskId, TaskState};

/// What happened to one branch operator in a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchReport {
    /// The query ran and a branch was chosen.
    Evaluated {
        task_id: TaskId,
        outcome: BranchOutcome,
    },
    /// The operator itself was skipped (by an upstream branch, or because an
    /// upstream task was skipped) and never queried the warehouse.
    Skipped { task_id: TaskId },
}

impl BranchReport {
    pub fn task_id(&self) -> &str {
        match self {
            BranchReport::Evaluated { task_id, .. } | BranchReport::Skipped { task_id } => task_id,
        }
    }
}

/// Evaluate branch operators for one run.
///
/// - With `only = Some(name)`, just that branch runs (it must be a
///   `[branch.<name>]`).
/// - Otherwise every branch runs in topological order.
///
/// This host applies an "all upstream succeeded" trigger rule: a branch
/// already marked skipped, or with any skipped upstream task, is itself
/// skipped without querying. Once the branches are done, skips are carried
/// down to every pending task with a skipped upstream. A branch operator on
/// its own only ever skips its direct downstream tasks. The first query error
/// aborts the run.
pub async fn run_branches<Q>(
    cfg: &ConfigFile,
    run: &mut DagRun,
    query: &mut Q,
    only: Option<&str>,
) -> Result<Vec<BranchReport>>
where
    Q: QueryExecutor + ?Sized,
{
    let graph = cfg.graph();
    let order = graph.topological_order();
    let selected: Vec<TaskId> = match only {
        Some(name) if cfg.branch.contains_key(name) => vec![name.to_string()],
        Some(name) => return Err(SqlBranchError::TaskNotFound(name.to_string())),
        None => order
            .iter()
            .filter(|t| cfg.branch.contains_key(*t))
            .cloned()
            .collect(),
    };
    debug!(?selected, "branch operators selected for this run");

    let mut reports = Vec::with_capacity(selected.len());

    for task_id in selected {
        if should_skip(graph, run, &task_id) {
            run.mark_skipped([&task_id])?;
            info!(task = %task_id, run_id = %run.run_id(), "branch operator skipped");
            reports.push(BranchReport::Skipped { task_id });
            continue;
        }

        let branch_cfg = cfg
            .branch
            .get(&task_id)
            .ok_or_else(|| SqlBranchError::TaskNotFound(task_id.clone()))?;
        let operator = BranchOperator::from_config(&task_id, branch_cfg)?;

        let ctx = TaskContext {
            task_id: task_id.clone(),
            run_id: run.run_id().to_string(),
            execution_date: run.execution_date(),
            downstream: graph.dependents_of(&task_id).to_vec(),
        };

        let outcome = operator.execute(&ctx, query, run).await?;
        run.mark_success(&task_id)?;
        reports.push(BranchReport::Evaluated { task_id, outcome });
    }

    propagate_skips(order, graph, run)?;

    Ok(reports)
}

/// Trigger rule of the local host ("all upstream succeeded"), not part of the
/// branch operator: mark every still-pending task with a skipped upstream as
/// skipped, walking in dependency order so skips flow all the way down.
fn propagate_skips(order: &[TaskId], graph: &DagGraph, run: &mut DagRun) -> Result<()> {
    for task_id in order {
        if run.state_of(task_id) == Some(TaskState::Pending) && should_skip(graph, run, task_id) {
            debug!(task = %task_id, "skipped because an upstream task was skipped");
            run.mark_skipped([task_id])?;
        }
    }
    Ok(())
}

fn should_skip(graph: &DagGraph, run: &DagRun, task_id: &str) -> bool {
    run.state_of(task_id) == Some(TaskState::Skipped)
        || graph
            .dependencies_of(task_id)
            .iter()
            .any(|dep| run.state_of(dep) == Some(TaskState::Skipped))
}
