//! In-container PostgreSQL tool invocations.
//!
//! Builds argument vectors only; running them is the gateway's and the
//! pipeline's job.

use crate::config::{DatabaseConfig, RestoreOptions};

/// Argument builder for `pg_dump` / `psql` inside the container
#[derive(Debug, Clone)]
pub struct PgCommands {
    dump_binary: String,
    client_binary: String,
    maintenance_database: String,
    stop_on_error: bool,
}

impl Default for PgCommands {
    fn default() -> Self {
        Self::new(&DatabaseConfig::default(), &RestoreOptions::default())
    }
}

impl PgCommands {
    pub fn new(database: &DatabaseConfig, restore: &RestoreOptions) -> Self {
        Self {
            dump_binary: database.dump_binary.clone(),
            client_binary: database.client_binary.clone(),
            maintenance_database: restore.maintenance_database.clone(),
            stop_on_error: restore.stop_on_error,
        }
    }

    /// Full logical dump used for backups
    pub fn dump(&self, user: &str, database: &str) -> Vec<String> {
        vec![
            self.dump_binary.clone(),
            "-U".to_string(),
            user.to_string(),
            database.to_string(),
        ]
    }

    /// Data-only dump with one INSERT per row, used for content digests
    pub fn data_dump(&self, user: &str, database: &str) -> Vec<String> {
        vec![
            self.dump_binary.clone(),
            "-U".to_string(),
            user.to_string(),
            "--data-only".to_string(),
            "--inserts".to_string(),
            database.to_string(),
        ]
    }

    /// Client reading a SQL script from stdin into `database`
    pub fn restore(&self, user: &str, database: &str) -> Vec<String> {
        let mut args = vec![
            self.client_binary.clone(),
            "-U".to_string(),
            user.to_string(),
            "-d".to_string(),
            database.to_string(),
        ];
        if self.stop_on_error {
            args.push("-v".to_string());
            args.push("ON_ERROR_STOP=1".to_string());
        }
        args
    }

    pub fn drop_database(&self, user: &str, database: &str) -> Vec<String> {
        self.maintenance(
            user,
            format!("DROP DATABASE IF EXISTS {};", quote_ident(database)),
        )
    }

    pub fn create_database(&self, user: &str, database: &str) -> Vec<String> {
        self.maintenance(user, format!("CREATE DATABASE {};", quote_ident(database)))
    }

    fn maintenance(&self, user: &str, sql: String) -> Vec<String> {
        vec![
            self.client_binary.clone(),
            "-U".to_string(),
            user.to_string(),
            "-d".to_string(),
            self.maintenance_database.clone(),
            "-c".to_string(),
            sql,
        ]
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
