use anyhow::{bail, Result};
use pg_backup_core::{Config, VerifyRequest};
use tracing::info;

use super::{service, Target};

pub async fn run(
    config: Config,
    source: &str,
    target: &str,
    database: Option<String>,
    user: Option<String>,
) -> Result<()> {
    let resolved = Target::resolve(&config, database, user);
    let request = VerifyRequest {
        source: source.to_string(),
        target: target.to_string(),
        database: resolved.database,
        user: resolved.user,
    };

    let service = service(config)?;
    let report = service.verify(&request).await?;

    info!("Source digest: {}", report.source_digest);
    info!("Target digest: {}", report.target_digest);

    if !report.matched {
        bail!(
            "Database {} differs between {} and {}",
            request.database,
            source,
            target
        );
    }

    println!("Databases match");
    Ok(())
}
