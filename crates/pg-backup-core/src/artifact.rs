//! Backup artifact naming and validated opening.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use crate::compression::{self, CompressionType};
use crate::error::ArtifactError;
use crate::Result;

/// Timestamp layout embedded in artifact names (one-second granularity)
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// Extension of the uncompressed logical dump
pub const DUMP_EXTENSION: &str = ".sql";

/// Build the deterministic artifact file name for a database and timestamp.
///
/// `appdb` at 2025-01-01 10:00:00 with gzip gives
/// `appdb_2025_01_01_10_00_00.sql.gz`.
pub fn file_name(database: &str, timestamp: NaiveDateTime, compression: CompressionType) -> String {
    format!(
        "{}_{}{}{}",
        database,
        timestamp.format(TIMESTAMP_FORMAT),
        DUMP_EXTENSION,
        compression::extension(compression)
    )
}

/// Full artifact path inside `output_dir`
pub fn path_for(
    output_dir: &Path,
    database: &str,
    timestamp: NaiveDateTime,
    compression: CompressionType,
) -> PathBuf {
    output_dir.join(file_name(database, timestamp, compression))
}

/// An artifact opened for reading whose header matched its format.
pub struct ArtifactReader {
    path: PathBuf,
    compression: CompressionType,
    size: u64,
    reader: Box<dyn AsyncRead + Unpin + Send>,
}

impl std::fmt::Debug for ArtifactReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactReader")
            .field("path", &self.path)
            .field("compression", &self.compression)
            .field("size", &self.size)
            .finish()
    }
}

impl ArtifactReader {
    /// Open an artifact, detecting its compression from the file extension.
    ///
    /// A name that carries no known extension is accepted only when its
    /// header identifies a compressed format.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::open_with(path, compression::detect_from_extension(path)).await
    }

    /// Open an artifact that is expected to use `compression`.
    ///
    /// Fails with `InvalidFormat` when the first bytes do not match the
    /// format, before anything is decompressed.
    pub async fn open_as(path: impl AsRef<Path>, compression: CompressionType) -> Result<Self> {
        Self::open_with(path.as_ref(), Some(compression)).await
    }

    async fn open_with(path: &Path, expected: Option<CompressionType>) -> Result<Self> {
        let path = path.to_path_buf();

        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArtifactError::NotFound(path.clone())
            } else {
                ArtifactError::Unreadable {
                    path: path.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let size = file
            .metadata()
            .await
            .map_err(|e| ArtifactError::Unreadable {
                path: path.clone(),
                message: e.to_string(),
            })?
            .len();

        let mut buffered = BufReader::new(file);
        let header = buffered
            .fill_buf()
            .await
            .map_err(|e| ArtifactError::Unreadable {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let compression = match check_header(header, expected) {
            Ok(compression) => compression,
            Err(message) => return Err(ArtifactError::InvalidFormat { path, message }.into()),
        };
        if expected.is_none() {
            debug!(
                "No known extension on {}, detected {:?} from header",
                path.display(),
                compression
            );
        }

        let reader = compression::reader(buffered, compression);
        Ok(Self {
            path,
            compression,
            size,
            reader,
        })
    }

    /// Path the artifact was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compression applied to the stored bytes
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Stored (compressed) size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Decompressed byte stream
    pub fn reader_mut(&mut self) -> &mut (dyn AsyncRead + Unpin + Send) {
        self.reader.as_mut()
    }
}

/// Decide the codec from the leading bytes and the codec the name implies
fn check_header(
    header: &[u8],
    expected: Option<CompressionType>,
) -> std::result::Result<CompressionType, String> {
    let detected = compression::detect_from_header(header);
    match expected {
        Some(CompressionType::None) => match detected {
            None => Ok(CompressionType::None),
            Some(actual) => Err(format!(
                "expected plain SQL but found a {:?} header",
                actual
            )),
        },
        Some(expected) if header.starts_with(expected.magic()) => Ok(expected),
        Some(expected) => Err(match detected {
            Some(actual) => format!(
                "expected {:?} data but found a {:?} header",
                expected, actual
            ),
            None if header.is_empty() => "file is empty".to_string(),
            None => format!("missing {:?} header", expected),
        }),
        None => detected.ok_or_else(|| {
            "unrecognized extension and no compressed header; plain dumps must end in .sql"
                .to_string()
        }),
    }
}
