//! Error types for the pg-backup core library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pg-backup library.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration or request validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Container runtime error
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Artifact error
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Byte stream between a process and storage was interrupted
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// External tool exited with a failure status
    #[error("{command} failed ({status}){}", format_diagnostics(.diagnostics))]
    Process {
        command: String,
        status: String,
        diagnostics: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error reports a missing or stopped container.
    pub fn is_container_liveness(&self) -> bool {
        matches!(
            self,
            Error::Container(ContainerError::NotFound { .. })
                | Error::Container(ContainerError::NotRunning { .. })
        )
    }

    /// Captured tool output attached to this error, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Error::Process { diagnostics, .. } => Some(diagnostics),
            Error::Transfer(TransferError::Stream { diagnostics, .. }) => Some(diagnostics),
            Error::Artifact(ArtifactError::Corrupt { diagnostics, .. }) => Some(diagnostics),
            Error::Container(ContainerError::NotFound { output, .. }) => Some(output),
            _ => None,
        }
    }
}

fn format_diagnostics(diagnostics: &str) -> String {
    if diagnostics.is_empty() {
        String::new()
    } else {
        format!("\nError output: {}", diagnostics)
    }
}

/// Container runtime errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ContainerError {
    /// The runtime could not resolve the container name
    #[error("container '{name}' not found: {output}")]
    NotFound { name: String, output: String },

    /// The container exists but is not running
    #[error("container '{name}' is not running (state: {state})")]
    NotRunning { name: String, state: String },

    /// The runtime binary itself could not be invoked
    #[error("failed to invoke container runtime '{binary}': {message}")]
    Runtime { binary: String, message: String },
}

/// Artifact errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Artifact path does not exist
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Artifact exists but cannot be opened or read
    #[error("failed to read artifact {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },

    /// Artifact header does not match its compression format
    #[error("invalid artifact format {}: {message}", .path.display())]
    InvalidFormat { path: PathBuf, message: String },

    /// Decompression failed part way through the stream
    #[error("corrupt artifact {}: {message}{}", .path.display(), format_diagnostics(.diagnostics))]
    Corrupt {
        path: PathBuf,
        message: String,
        /// Output of the restore process that was fed the partial stream
        diagnostics: String,
    },
}

/// Transfer pipeline errors
#[derive(Error, Debug)]
pub enum TransferError {
    /// The external process could not be started
    #[error("failed to start {command}: {message}")]
    Spawn { command: String, message: String },

    /// Copying between the process and storage failed
    #[error("stream to/from {command} interrupted: {message}{}", format_diagnostics(.diagnostics))]
    Stream {
        command: String,
        message: String,
        diagnostics: String,
    },
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
