use tracing::{debug, info};

use super::{require, BackupService, VerifyRequest};
use crate::transfer::{self, Digest};
use crate::Result;

/// Outcome of comparing two databases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub source_digest: Digest,
    pub target_digest: Digest,
    /// Digests are equal
    pub matched: bool,
}

impl BackupService {
    /// Compare the data of one database across two containers.
    ///
    /// Only row content is compared, not schema or indexes. A mismatch is a
    /// normal outcome (`matched == false`); failing to dump either side is an
    /// error.
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerifyReport> {
        require("source", &request.source)?;
        require("target", &request.target)?;
        require("database", &request.database)?;

        self.runtime.verify_container(&request.source).await?;
        self.runtime.verify_container(&request.target).await?;

        info!(
            "Comparing database {} between {} and {}",
            request.database, request.source, request.target
        );

        let source_digest = self.content_digest(&request.source, request).await?;
        let target_digest = self.content_digest(&request.target, request).await?;

        let matched = source_digest == target_digest;
        debug!(
            "source digest {}, target digest {}",
            source_digest, target_digest
        );

        Ok(VerifyReport {
            source_digest,
            target_digest,
            matched,
        })
    }

    async fn content_digest(&self, container: &str, request: &VerifyRequest) -> Result<Digest> {
        let command = self.runtime.command(
            container,
            &self.pg.data_dump(&request.user, &request.database),
            false,
        );
        let (digest, stats) = transfer::digest(command).await?;
        debug!(
            "Hashed {} bytes of {} on {}",
            stats.bytes_read, request.database, container
        );
        Ok(digest)
    }
}
