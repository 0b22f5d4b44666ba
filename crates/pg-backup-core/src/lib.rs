//! pg-backup Core Library
//!
//! This crate provides streaming backup, restore and verification of
//! PostgreSQL databases running inside containers. Dumps are piped from
//! `pg_dump` through a compressor to disk and back into `psql` without
//! buffering whole databases in memory.

pub mod artifact;
pub mod compression;
pub mod config;
pub mod container;
pub mod error;
pub mod postgres;
pub mod service;
pub mod transfer;

pub use artifact::ArtifactReader;
pub use compression::CompressionType;
pub use config::{BackupOptions, Config, DatabaseConfig, RestoreOptions, RuntimeConfig};
pub use container::{ContainerRuntime, DockerRuntime, ExecOutput};
pub use error::{ArtifactError, ContainerError, Error, Result, TransferError};
pub use postgres::PgCommands;
pub use service::{
    BackupOutput, BackupRequest, BackupService, RestoreRequest, RoundTripReport,
    RoundTripRequest, VerifyReport, VerifyRequest,
};
pub use transfer::{Digest, TransferStats};
