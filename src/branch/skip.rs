// src/branch/skip.rs

use crate::branch::evaluator::BranchDecision;
use crate::types::TaskId;

/// Every downstream task except the followed branch, in input order.
pub fn skip_set(downstream: &[TaskId], decision: &BranchDecision) -> Vec<TaskId> {
    downstream
        .iter()
        .filter(|t| t.as_str() != decision.task_id())
        .cloned()
        .collect()
}
