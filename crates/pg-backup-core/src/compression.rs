//! Streaming compression for backup artifacts.
//!
//! Encoders and decoders wrap tokio readers/writers so the transfer pipeline
//! never holds a whole dump in memory.

use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use async_compression::tokio::write::{GzipEncoder, ZstdEncoder};
use async_compression::Level;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite};

/// Default compression level for gzip
pub const DEFAULT_GZIP_LEVEL: i32 = 6;

/// Default compression level for zstd
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Compression algorithm applied to artifacts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    None,
    #[default]
    Gzip,
    Zstd,
}

impl CompressionType {
    /// Accepted compression levels for this algorithm
    pub fn level_range(self) -> RangeInclusive<i32> {
        match self {
            CompressionType::None => 0..=0,
            CompressionType::Gzip => 0..=9,
            CompressionType::Zstd => 1..=22,
        }
    }

    /// Leading bytes every stream of this format starts with
    pub fn magic(self) -> &'static [u8] {
        match self {
            CompressionType::None => &[],
            CompressionType::Gzip => GZIP_MAGIC,
            CompressionType::Zstd => ZSTD_MAGIC,
        }
    }

    fn default_level(self) -> i32 {
        match self {
            CompressionType::None => 0,
            CompressionType::Gzip => DEFAULT_GZIP_LEVEL,
            CompressionType::Zstd => DEFAULT_ZSTD_LEVEL,
        }
    }
}

/// Get file extension for compression type
pub fn extension(compression: CompressionType) -> &'static str {
    match compression {
        CompressionType::None => "",
        CompressionType::Gzip => ".gz",
        CompressionType::Zstd => ".zst",
    }
}

/// Detect compression type from file extension.
///
/// Returns `None` for extensions that name no artifact format; only `.sql`
/// means an uncompressed dump.
pub fn detect_from_extension(path: &Path) -> Option<CompressionType> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Some(CompressionType::Gzip),
        Some("zst") => Some(CompressionType::Zstd),
        Some("sql") => Some(CompressionType::None),
        _ => None,
    }
}

/// Detect compression type from the first bytes of a stream.
///
/// Returns `None` when the header matches no known compressed format.
pub fn detect_from_header(header: &[u8]) -> Option<CompressionType> {
    [CompressionType::Gzip, CompressionType::Zstd]
        .into_iter()
        .find(|c| header.starts_with(c.magic()))
}

/// Wrap a writer in a compressing encoder.
///
/// The caller must `shutdown()` the returned writer to emit the trailer.
pub fn writer<W>(
    inner: W,
    compression: CompressionType,
    level: Option<i32>,
) -> Box<dyn AsyncWrite + Unpin + Send>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let level = Level::Precise(level.unwrap_or_else(|| compression.default_level()));
    match compression {
        CompressionType::None => Box::new(inner),
        CompressionType::Gzip => Box::new(GzipEncoder::with_quality(inner, level)),
        CompressionType::Zstd => Box::new(ZstdEncoder::with_quality(inner, level)),
    }
}

/// Wrap a buffered reader in a decompressing decoder
pub fn reader<R>(inner: R, compression: CompressionType) -> Box<dyn AsyncRead + Unpin + Send>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    match compression {
        CompressionType::None => Box::new(inner),
        CompressionType::Gzip => {
            let mut decoder = GzipDecoder::new(inner);
            // `cat a.gz b.gz` is still a valid artifact
            decoder.multiple_members(true);
            Box::new(decoder)
        }
        CompressionType::Zstd => {
            let mut decoder = ZstdDecoder::new(inner);
            decoder.multiple_members(true);
            Box::new(decoder)
        }
    }
}
