pub mod backup;
pub mod restore;
pub mod verify;

use anyhow::{Context, Result};
use pg_backup_core::{BackupService, Config};
use std::path::PathBuf;
use tracing::info;

/// Load the configuration file if one was given, defaults otherwise
pub fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            Config::from_file(path).with_context(|| format!("Invalid configuration: {}", path))
        }
        None => Ok(Config::default()),
    }
}

/// Flags override configuration; configuration supplies the rest
pub struct Target {
    pub database: String,
    pub user: String,
}

impl Target {
    pub fn resolve(config: &Config, database: Option<String>, user: Option<String>) -> Self {
        Self {
            database: database.unwrap_or_else(|| config.database.name.clone()),
            user: user.unwrap_or_else(|| config.database.user.clone()),
        }
    }
}

pub fn output_dir(config: &Config, output: Option<String>) -> PathBuf {
    output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.backup.output_dir.clone())
}

pub fn service(config: Config) -> Result<BackupService> {
    Ok(BackupService::with_docker(config)?)
}

/// Local wall-clock time used to name artifacts
pub fn timestamp() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
