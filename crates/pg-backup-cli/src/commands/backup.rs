use anyhow::Result;
use pg_backup_core::{BackupRequest, Config};
use tracing::info;

use super::{output_dir, service, timestamp, Target};

pub async fn run(
    config: Config,
    container: &str,
    database: Option<String>,
    user: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let target = Target::resolve(&config, database, user);
    let request = BackupRequest {
        container: container.to_string(),
        database: target.database,
        user: target.user,
        output_dir: output_dir(&config, output),
        timestamp: timestamp(),
    };

    info!(
        "Starting backup of {} from container {}",
        request.database, request.container
    );

    let service = service(config)?;
    let result = service.backup(&request).await?;

    info!(
        "Backup completed: {} bytes dumped, {} bytes written ({:.2} MB/s)",
        result.stats.bytes_read,
        result.stats.bytes_written,
        result.stats.throughput_mb_per_sec()
    );
    println!("{}", result.path.display());
    Ok(())
}
