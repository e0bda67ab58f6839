#![allow(dead_code)]

use sqlbranch::config::{
    BranchConfig, ConfigFile, ConnectionConfig, RawConfigFile, TaskConfig,
};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_branch(mut self, name: &str, branch: BranchConfig) -> Self {
        self.config.branch.insert(name.to_string(), branch);
        self
    }

    /// Add a plain downstream task.
    pub fn with_task(mut self, name: &str, after: &[&str]) -> Self {
        self.config.task.insert(
            name.to_string(),
            TaskConfig {
                after: after.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_connection(mut self, id: &str, conn: ConnectionConfig) -> Self {
        self.config.connection.insert(id.to_string(), conn);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `BranchConfig`.
pub struct BranchConfigBuilder {
    branch: BranchConfig,
}

impl BranchConfigBuilder {
    pub fn new(sql: &str, pass_task: &str, fail_task: &str) -> Self {
        Self {
            branch: BranchConfig {
                sql: Some(sql.to_string()),
                pass_task: Some(pass_task.to_string()),
                fail_task: Some(fail_task.to_string()),
                ..BranchConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.branch.after.push(dep.to_string());
        self
    }

    pub fn use_legacy_sql(mut self, val: bool) -> Self {
        self.branch.use_legacy_sql = val;
        self
    }

    pub fn connection_id(mut self, id: &str) -> Self {
        self.branch.connection_id = id.to_string();
        self
    }

    pub fn delegate_to(mut self, account: &str) -> Self {
        self.branch.delegate_to = Some(account.to_string());
        self
    }

    pub fn build(self) -> BranchConfig {
        self.branch
    }
}
