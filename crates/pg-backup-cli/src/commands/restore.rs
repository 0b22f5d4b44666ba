use anyhow::Result;
use pg_backup_core::{Config, RestoreRequest};
use std::path::PathBuf;
use tracing::info;

use super::{service, Target};

pub async fn run(
    config: Config,
    container: &str,
    file: &str,
    database: Option<String>,
    user: Option<String>,
    drop: bool,
) -> Result<()> {
    let target = Target::resolve(&config, database, user);
    let request = RestoreRequest {
        container: container.to_string(),
        database: target.database,
        user: target.user,
        artifact: PathBuf::from(file),
        drop_existing: drop,
    };

    info!(
        "Restoring {} into {} on container {}",
        file, request.database, request.container
    );

    let service = service(config)?;
    let stats = service.restore(&request).await?;

    info!(
        "Restore completed: {} bytes loaded in {:.1}s",
        stats.bytes_written,
        stats.elapsed.as_secs_f64()
    );
    Ok(())
}
