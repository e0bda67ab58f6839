use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use sqlbranch::dag::SkipScheduler;
use sqlbranch::errors::Result;

/// One call to [`SkipScheduler::skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipCall {
    pub run_id: String,
    pub execution_date: DateTime<Utc>,
    pub tasks: Vec<String>,
}

/// A skip port that only records what it was asked to skip.
#[derive(Debug, Clone, Default)]
pub struct RecordingSkipper {
    pub calls: Vec<SkipCall>,
}

impl RecordingSkipper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SkipScheduler for RecordingSkipper {
    fn skip<'a>(
        &'a mut self,
        run_id: &'a str,
        execution_date: DateTime<Utc>,
        tasks: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.push(SkipCall {
                run_id: run_id.to_string(),
                execution_date,
                tasks: tasks.to_vec(),
            });
            Ok(())
        })
    }
}
