use std::path::PathBuf;
use tracing::info;

use super::{
    BackupRequest, BackupService, RestoreRequest, RoundTripRequest, VerifyReport, VerifyRequest,
};
use crate::transfer::TransferStats;
use crate::Result;

/// Result of a backup → restore → verify run
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    pub artifact: PathBuf,
    pub backup: TransferStats,
    pub restore: TransferStats,
    pub verify: VerifyReport,
}

impl RoundTripReport {
    pub fn matched(&self) -> bool {
        self.verify.matched
    }
}

impl BackupService {
    /// Back up `source`, restore the artifact into a freshly dropped database
    /// on `target`, then compare both. Stops at the first failing stage.
    pub async fn round_trip(&self, request: &RoundTripRequest) -> Result<RoundTripReport> {
        info!("Step 1: creating backup from {}", request.source);
        let backup = self
            .backup(&BackupRequest {
                container: request.source.clone(),
                database: request.database.clone(),
                user: request.user.clone(),
                output_dir: request.output_dir.clone(),
                timestamp: request.timestamp,
            })
            .await?;

        info!("Step 2: restoring {} into {}", backup.path.display(), request.target);
        let restore = self
            .restore(&RestoreRequest {
                container: request.target.clone(),
                database: request.database.clone(),
                user: request.user.clone(),
                artifact: backup.path.clone(),
                drop_existing: true,
            })
            .await?;

        info!("Step 3: verifying {} against {}", request.source, request.target);
        let verify = self
            .verify(&VerifyRequest {
                source: request.source.clone(),
                target: request.target.clone(),
                database: request.database.clone(),
                user: request.user.clone(),
            })
            .await?;

        Ok(RoundTripReport {
            artifact: backup.path,
            backup: backup.stats,
            restore,
            verify,
        })
    }
}
