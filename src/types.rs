use std::fmt;

/// Identifier of a task in the host DAG.
pub type TaskId = String;

/// SQL dialect the warehouse should parse the query with.
///
/// - `Legacy`: the warehouse's legacy SQL dialect (the default for branch
///   operators, `use_legacy_sql = true`).
/// - `Standard`: ANSI-style standard SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Legacy,
    Standard,
}

impl SqlDialect {
    pub fn from_use_legacy_sql(use_legacy_sql: bool) -> Self {
        if use_legacy_sql {
            SqlDialect::Legacy
        } else {
            SqlDialect::Standard
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, SqlDialect::Legacy)
    }
}

impl Default for SqlDialect {
    fn default() -> Self {
        SqlDialect::Legacy
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Legacy => f.write_str("legacy"),
            SqlDialect::Standard => f.write_str("standard"),
        }
    }
}

/// Per-run state of a task as tracked by the local host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not yet evaluated in this run.
    Pending,
    /// Branch operator ran to completion.
    Success,
    /// Marked as intentionally not executed for this run.
    Skipped,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => f.write_str("pending"),
            TaskState::Success => f.write_str("success"),
            TaskState::Skipped => f.write_str("skipped"),
        }
    }
}
