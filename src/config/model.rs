// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::dag::DagGraph;
use crate::types::SqlDialect;

/// Connection id used when a branch does not name one.
pub const DEFAULT_CONNECTION_ID: &str = "bigquery_default";

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// sql_search_path = ["sql"]
///
/// [connection.bigquery_default]
/// program = "bq"
/// args = ["--project_id=my-project"]
/// cell_types = "schema"
///
/// [branch.check_table]
/// sql = "select count(*) from my_dataset.my_table"
/// pass_task = "load"
/// fail_task = "alert"
/// use_legacy_sql = false
///
/// [task.load]
/// after = ["check_table"]
///
/// [task.alert]
/// after = ["check_table"]
/// ```
///
/// All sections are optional at parse time; validation then requires at
/// least one `[branch.<name>]`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Warehouse connections from `[connection.<id>]`.
    #[serde(default)]
    pub connection: BTreeMap<String, ConnectionConfig>,

    /// Branch operators from `[branch.<task_id>]`.
    #[serde(default)]
    pub branch: BTreeMap<String, BranchConfig>,

    /// Plain downstream tasks from `[task.<task_id>]`.
    ///
    /// These are never executed by sqlbranch; they exist so branch operators
    /// know their downstream set.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>`, so holding one means
/// the DAG is acyclic, every `after` reference exists and every branch has
/// both of its target tasks and exactly one SQL source.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub connection: BTreeMap<String, ConnectionConfig>,
    pub branch: BTreeMap<String, BranchConfig>,
    pub task: BTreeMap<String, TaskConfig>,
    graph: DagGraph,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        connection: BTreeMap<String, ConnectionConfig>,
        branch: BTreeMap<String, BranchConfig>,
        task: BTreeMap<String, TaskConfig>,
        graph: DagGraph,
    ) -> Self {
        Self {
            config,
            connection,
            branch,
            task,
            graph,
        }
    }

    /// Task DAG built from the `after` lists during validation.
    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Directories searched, in order, for `sql_file` references.
    ///
    /// Relative entries are resolved against the config file's directory.
    /// When empty, only the config file's directory is searched.
    #[serde(default)]
    pub sql_search_path: Vec<PathBuf>,
}

/// `[connection.<id>]` section: how to reach the warehouse client.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Client executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Global arguments placed before the `query` command
    /// (e.g. `--project_id=...`, `--location=EU`).
    #[serde(default)]
    pub args: Vec<String>,

    /// Where cell types come from.
    #[serde(default)]
    pub cell_types: CellTypes,
}

/// How result cells get their types.
///
/// - `Schema`: run a dry run first and type cells from the result schema.
///   Needed for `bq`, which prints every cell as a JSON string.
/// - `Json`: trust the JSON types printed by the client, no dry run.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CellTypes {
    Schema,
    Json,
}

impl Default for CellTypes {
    fn default() -> Self {
        CellTypes::Schema
    }
}

fn default_program() -> String {
    "bq".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            cell_types: CellTypes::default(),
        }
    }
}

/// `[branch.<task_id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchConfig {
    /// Inline query. Mutually exclusive with `sql_file`.
    #[serde(default)]
    pub sql: Option<String>,

    /// Name of a `.sql` file looked up on `[config].sql_search_path`.
    #[serde(default)]
    pub sql_file: Option<String>,

    /// Task followed when every column of the first row is truthy.
    #[serde(default)]
    pub pass_task: Option<String>,

    /// Task followed otherwise.
    #[serde(default)]
    pub fail_task: Option<String>,

    #[serde(default = "default_use_legacy_sql")]
    pub use_legacy_sql: bool,

    #[serde(default = "default_connection_id")]
    pub connection_id: String,

    /// Account to impersonate when running the query.
    #[serde(default)]
    pub delegate_to: Option<String>,

    #[serde(default)]
    pub after: Vec<String>,
}

fn default_use_legacy_sql() -> bool {
    true
}

fn default_connection_id() -> String {
    DEFAULT_CONNECTION_ID.to_string()
}

impl BranchConfig {
    pub fn dialect(&self) -> SqlDialect {
        SqlDialect::from_use_legacy_sql(self.use_legacy_sql)
    }
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            sql: None,
            sql_file: None,
            pass_task: None,
            fail_task: None,
            use_legacy_sql: default_use_legacy_sql(),
            connection_id: default_connection_id(),
            delegate_to: None,
            after: Vec::new(),
        }
    }
}

/// `[task.<task_id>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Tasks this one waits for.
    #[serde(default)]
    pub after: Vec<String>,
}
