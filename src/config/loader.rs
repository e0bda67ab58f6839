// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SqlBranchError};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it and inline every
/// `sql_file` reference.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks branch settings, `after` references and DAG cycles.
/// - Reads `sql_file`s relative to the config file's directory, so a missing
///   query file is reported before anything runs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let mut config = ConfigFile::try_from(raw_config)?;
    resolve_sql_files(&mut config, &config_dir(path.as_ref()))?;
    Ok(config)
}

/// Replace each branch's `sql_file` with the file's contents in `sql`.
///
/// The file is looked up in `[config].sql_search_path` (relative entries
/// resolved against `base_dir`), or in `base_dir` alone when the search path
/// is empty. The first match wins.
pub fn resolve_sql_files(cfg: &mut ConfigFile, base_dir: &Path) -> Result<()> {
    let search_path: Vec<PathBuf> = if cfg.config.sql_search_path.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        cfg.config
            .sql_search_path
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    base_dir.join(dir)
                }
            })
            .collect()
    };

    for (name, branch) in cfg.branch.iter_mut() {
        let Some(file) = branch.sql_file.take() else {
            continue;
        };

        let found = search_path
            .iter()
            .map(|dir| dir.join(&file))
            .find(|candidate| candidate.is_file());

        let Some(path) = found else {
            return Err(SqlBranchError::ConfigError(format!(
                "branch '{}': sql_file '{}' not found in search path {:?}",
                name, file, search_path
            )));
        };

        debug!(branch = %name, path = %path.display(), "loaded sql_file");
        branch.sql = Some(fs::read_to_string(&path)?);
    }

    Ok(())
}

/// Directory containing the config file, or "." for a bare filename.
fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
