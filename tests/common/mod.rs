#![allow(dead_code, unused_imports)]

pub use sqlbranch_test_utils::builders;
pub use sqlbranch_test_utils::fake_query::FakeQueryExecutor;
pub use sqlbranch_test_utils::{init_tracing, with_timeout};
pub use sqlbranch_test_utils::recording_skipper::{RecordingSkipper, SkipCall};

use sqlbranch::branch::{ResultRow, Value};

/// Build a row from anything convertible into `Value`.
pub fn row<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> ResultRow {
    values.into_iter().map(Into::into).collect()
}

pub fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
