use tracing::{info, warn};

use super::{require, BackupService, RestoreRequest};
use crate::artifact::ArtifactReader;
use crate::transfer::{self, TransferStats};
use crate::{Error, Result};

impl BackupService {
    /// Load an artifact into a database inside a container.
    ///
    /// The artifact is validated before the database is touched. With
    /// `drop_existing` every lifecycle step is fatal; without it a failing
    /// CREATE DATABASE only means the database is already there.
    pub async fn restore(&self, request: &RestoreRequest) -> Result<TransferStats> {
        require("container", &request.container)?;
        require("database", &request.database)?;

        self.runtime.verify_container(&request.container).await?;

        let mut artifact = ArtifactReader::open(&request.artifact).await?;
        info!(
            "Restoring {} ({:?}, {} bytes) into database {} on container {}",
            artifact.path().display(),
            artifact.compression(),
            artifact.size(),
            request.database,
            request.container
        );

        if request.drop_existing {
            info!("Dropping database {}", request.database);
            let command = self.pg.drop_database(&request.user, &request.database);
            let out = self.runtime.exec(&request.container, &command).await?;
            if !out.success() {
                return Err(Error::Process {
                    command: "drop database".to_string(),
                    status: out.status.to_string(),
                    diagnostics: out.output_text(),
                });
            }
        }

        let command = self.pg.create_database(&request.user, &request.database);
        let out = self.runtime.exec(&request.container, &command).await?;
        if !out.success() {
            if request.drop_existing {
                return Err(Error::Process {
                    command: "create database".to_string(),
                    status: out.status.to_string(),
                    diagnostics: out.output_text(),
                });
            }
            warn!("Database may already exist: {}", out.output_text());
        }

        let command = self.runtime.command(
            &request.container,
            &self.pg.restore(&request.user, &request.database),
            true,
        );
        let stats = transfer::import(&mut artifact, command).await?;

        info!("Restore of database {} completed", request.database);
        Ok(stats)
    }
}
