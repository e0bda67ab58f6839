// src/dag/skipper.rs

//! Host-side "skip these tasks" port.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::types::TaskId;

/// Trait abstracting the host scheduler's skip API.
///
/// [`DagRun`](crate::dag::DagRun) is the in-memory implementation used by the
/// CLI; tests can record calls instead. Skipping is idempotent and order
/// independent, so implementations may receive the same task more than once.
pub trait SkipScheduler: Send {
    fn skip<'a>(
        &'a mut self,
        run_id: &'a str,
        execution_date: DateTime<Utc>,
        tasks: &'a [TaskId],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
