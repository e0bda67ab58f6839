// src/dag/mod.rs

//! Host-side view of the task graph.
//!
//! - [`graph`] holds the DAG of branch operators and plain tasks and answers
//!   "what is downstream of X".
//! - [`skipper`] defines the `SkipScheduler` port branch operators report
//!   their skip set to.
//! - [`run_state`] tracks per-run task states and implements that port.

pub mod graph;
pub mod run_state;
pub mod skipper;

pub use graph::DagGraph;
pub use run_state::DagRun;
pub use skipper::SkipScheduler;
