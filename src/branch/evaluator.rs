// src/branch/evaluator.rs

use crate::branch::value::ResultRow;
use crate::types::TaskId;

/// The branch chosen for one execution of a branch operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDecision {
    /// Every column of the row was truthy; follow the pass task.
    Pass(TaskId),
    /// No row, an empty row, or at least one falsy column; follow the fail task.
    Fail(TaskId),
}

impl BranchDecision {
    /// Id of the task to follow.
    pub fn task_id(&self) -> &str {
        match self {
            BranchDecision::Pass(id) | BranchDecision::Fail(id) => id,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, BranchDecision::Pass(_))
    }
}

/// Choose a branch from the first row of a query result.
///
/// - `None` (no rows) or a row with zero columns → `Fail(fail_task)`.
/// - Otherwise `Pass(pass_task)` iff every value is truthy
///   (see [`Value::is_truthy`](crate::branch::Value::is_truthy)).
pub fn decide(row: Option<&ResultRow>, pass_task: &str, fail_task: &str) -> BranchDecision {
    match row {
        Some(row) if row.all_truthy() => BranchDecision::Pass(pass_task.to_string()),
        _ => BranchDecision::Fail(fail_task.to_string()),
    }
}
