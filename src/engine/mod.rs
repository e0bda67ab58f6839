// src/engine/mod.rs

//! Local host loop.
//!
//! sqlbranch is not a scheduler: [`runner`] only walks the branch operators
//! of one DAG run in dependency order, hands each its downstream set and
//! records the resulting skips in a [`DagRun`](crate::dag::DagRun).

pub mod runner;

pub use runner::{BranchReport, run_branches};
