// src/config/validate.rs

use tracing::warn;

use crate::config::model::{
    BranchConfig, ConfigFile, ConnectionConfig, DEFAULT_CONNECTION_ID, RawConfigFile,
};
use crate::dag::DagGraph;
use crate::errors::{Result, SqlBranchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SqlBranchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let graph = DagGraph::build(
            after_lists(&raw).map(|(name, after)| (name.as_str(), after.as_slice())),
        )?;

        let mut connection = raw.connection;
        connection
            .entry(DEFAULT_CONNECTION_ID.to_string())
            .or_insert_with(ConnectionConfig::default);

        let cfg = ConfigFile::new_unchecked(raw.config, connection, raw.branch, raw.task, graph);
        warn_on_non_downstream_targets(&cfg);
        Ok(cfg)
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_branches(cfg)?;
    ensure_unique_names(cfg)?;
    for (name, branch) in cfg.branch.iter() {
        validate_branch(cfg, name, branch)?;
    }
    validate_task_dependencies(cfg)?;
    Ok(())
}

fn ensure_has_branches(cfg: &RawConfigFile) -> Result<()> {
    if cfg.branch.is_empty() {
        return Err(SqlBranchError::ConfigError(
            "config must contain at least one [branch.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_names(cfg: &RawConfigFile) -> Result<()> {
    if let Some(name) = cfg.branch.keys().find(|n| cfg.task.contains_key(*n)) {
        return Err(SqlBranchError::ConfigError(format!(
            "'{name}' is declared both as [branch.{name}] and [task.{name}]"
        )));
    }
    Ok(())
}

fn validate_branch(cfg: &RawConfigFile, name: &str, branch: &BranchConfig) -> Result<()> {
    require_task_id(name, "pass_task", branch.pass_task.as_deref())?;
    require_task_id(name, "fail_task", branch.fail_task.as_deref())?;

    match (&branch.sql, &branch.sql_file) {
        (Some(_), Some(_)) => {
            return Err(SqlBranchError::ConfigError(format!(
                "branch '{name}' sets both `sql` and `sql_file`"
            )));
        }
        (None, None) => {
            return Err(SqlBranchError::ConfigError(format!(
                "branch '{name}' needs one of `sql` or `sql_file`"
            )));
        }
        (Some(sql), None) if sql.trim().is_empty() => {
            return Err(SqlBranchError::ConfigError(format!(
                "branch '{name}' has an empty `sql`"
            )));
        }
        (None, Some(file)) if !file.ends_with(".sql") => {
            return Err(SqlBranchError::ConfigError(format!(
                "branch '{name}': `sql_file` must end in .sql (got '{file}')"
            )));
        }
        _ => {}
    }

    if branch.connection_id != DEFAULT_CONNECTION_ID
        && !cfg.connection.contains_key(&branch.connection_id)
    {
        return Err(SqlBranchError::ConfigError(format!(
            "branch '{}' uses unknown connection_id '{}'",
            name, branch.connection_id
        )));
    }

    Ok(())
}

fn require_task_id(branch: &str, field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(id) if !id.trim().is_empty() => Ok(()),
        Some(_) => Err(SqlBranchError::ConfigError(format!(
            "branch '{branch}' has an empty `{field}`"
        ))),
        None => Err(SqlBranchError::ConfigError(format!(
            "branch '{branch}' is missing `{field}`"
        ))),
    }
}

fn after_lists(cfg: &RawConfigFile) -> impl Iterator<Item = (&String, &Vec<String>)> {
    cfg.branch
        .iter()
        .map(|(n, b)| (n, &b.after))
        .chain(cfg.task.iter().map(|(n, t)| (n, &t.after)))
}

fn is_known(cfg: &RawConfigFile, name: &str) -> bool {
    cfg.branch.contains_key(name) || cfg.task.contains_key(name)
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, after) in after_lists(cfg) {
        for dep in after.iter() {
            if !is_known(cfg, dep) {
                return Err(SqlBranchError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(SqlBranchError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}

/// Branch targets are allowed to be anything; the operator only ever skips
/// its direct downstream tasks, so a target outside that set just means
/// nothing gets followed. Worth a warning, not an error.
fn warn_on_non_downstream_targets(cfg: &ConfigFile) {
    for (name, branch) in cfg.branch.iter() {
        let targets = [branch.pass_task.as_deref(), branch.fail_task.as_deref()];
        for target in targets.into_iter().flatten() {
            let downstream = cfg.graph().dependents_of(name).iter().any(|d| d == target);
            if !downstream {
                warn!(
                    branch = %name,
                    target = %target,
                    "branch target is not a direct downstream task"
                );
            }
        }
    }
}
