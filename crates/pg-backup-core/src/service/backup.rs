use std::path::PathBuf;
use tracing::info;

use super::{require, BackupRequest, BackupService};
use crate::artifact;
use crate::transfer::{self, TransferStats};
use crate::{Error, Result};

/// Artifact produced by a successful backup
#[derive(Debug, Clone)]
pub struct BackupOutput {
    pub path: PathBuf,
    pub stats: TransferStats,
}

impl BackupService {
    /// Dump a database into a compressed artifact and return its path.
    ///
    /// The container is checked before anything touches the filesystem, so a
    /// stopped container never leaves an artifact behind.
    pub async fn backup(&self, request: &BackupRequest) -> Result<BackupOutput> {
        require("container", &request.container)?;
        require("database", &request.database)?;

        self.runtime.verify_container(&request.container).await?;

        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| {
                Error::Config(format!(
                    "Failed to create output directory {}: {}",
                    request.output_dir.display(),
                    e
                ))
            })?;

        let compression = self.config.backup.compression;
        let path = artifact::path_for(
            &request.output_dir,
            &request.database,
            request.timestamp,
            compression,
        );

        info!(
            "Backing up database {} from container {} to {}",
            request.database,
            request.container,
            path.display()
        );

        let command = self.runtime.command(
            &request.container,
            &self.pg.dump(&request.user, &request.database),
            false,
        );
        let stats = transfer::export(
            command,
            &path,
            compression,
            self.config.backup.compression_level,
        )
        .await?;

        Ok(BackupOutput { path, stats })
    }
}
