// src/branch/mod.rs

//! Branch decision rule.
//!
//! - [`value`] defines the scalar values a query row is made of and the
//!   explicit truthiness rule applied to them.
//! - [`evaluator`] turns a (possibly absent) row into a [`BranchDecision`].
//! - [`skip`] computes which downstream tasks must be skipped once a branch
//!   has been chosen.
//!
//! Everything in here is pure: no IO, no logging, no Tokio.

pub mod evaluator;
pub mod skip;
pub mod value;

pub use evaluator::{BranchDecision, decide};
pub use skip::skip_set;
pub use value::{ResultRow, Value};
