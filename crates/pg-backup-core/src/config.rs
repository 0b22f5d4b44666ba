//! Configuration structures for backup, restore and verify operations.
//!
//! Every field has a default, so an empty (or missing) configuration file is
//! valid. Command-line flags override values loaded from here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compression::CompressionType;
use crate::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Container runtime settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Database connection defaults and tool binaries
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Backup-specific options
    #[serde(default)]
    pub backup: BackupOptions,

    /// Restore-specific options
    #[serde(default)]
    pub restore: RestoreOptions,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.runtime.binary.trim().is_empty() {
            return Err(Error::Config("runtime.binary must not be empty".to_string()));
        }
        if self.database.dump_binary.trim().is_empty() {
            return Err(Error::Config(
                "database.dump_binary must not be empty".to_string(),
            ));
        }
        if self.database.client_binary.trim().is_empty() {
            return Err(Error::Config(
                "database.client_binary must not be empty".to_string(),
            ));
        }
        if self.restore.maintenance_database.trim().is_empty() {
            return Err(Error::Config(
                "restore.maintenance_database must not be empty".to_string(),
            ));
        }
        if let Some(level) = self.backup.compression_level {
            let range = self.backup.compression.level_range();
            if !range.contains(&level) {
                return Err(Error::Config(format!(
                    "compression_level {} out of range {:?} for {:?}",
                    level, range, self.backup.compression
                )));
            }
        }
        Ok(())
    }
}

/// Container runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime CLI binary (docker, podman, ...)
    #[serde(default = "default_runtime_binary")]
    pub binary: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: default_runtime_binary(),
        }
    }
}

fn default_runtime_binary() -> String {
    "docker".to_string()
}

/// Database defaults and in-container tool names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database used when none is given on the command line
    #[serde(default = "default_database")]
    pub name: String,

    /// Role used when none is given on the command line
    #[serde(default = "default_user")]
    pub user: String,

    /// Dump tool inside the container
    #[serde(default = "default_dump_binary")]
    pub dump_binary: String,

    /// SQL client inside the container
    #[serde(default = "default_client_binary")]
    pub client_binary: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database(),
            user: default_user(),
            dump_binary: default_dump_binary(),
            client_binary: default_client_binary(),
        }
    }
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_dump_binary() -> String {
    "pg_dump".to_string()
}

fn default_client_binary() -> String {
    "psql".to_string()
}

/// Backup-specific options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupOptions {
    /// Directory that receives artifacts (default: ./backups)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Compression algorithm (default: gzip)
    #[serde(default)]
    pub compression: CompressionType,

    /// Compression level; the codec default is used when unset
    #[serde(default)]
    pub compression_level: Option<i32>,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            compression: CompressionType::default(),
            compression_level: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./backups")
}

/// Restore-specific options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreOptions {
    /// Database psql connects to for CREATE/DROP DATABASE
    #[serde(default = "default_maintenance_database")]
    pub maintenance_database: String,

    /// Abort the restore on the first failing SQL statement
    #[serde(default)]
    pub stop_on_error: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            maintenance_database: default_maintenance_database(),
            stop_on_error: false,
        }
    }
}

fn default_maintenance_database() -> String {
    "template1".to_string()
}
