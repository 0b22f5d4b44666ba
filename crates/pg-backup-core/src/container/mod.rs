//! Container runtime gateway.
//!
//! Everything that touches the database goes through a command executed
//! inside the container. The gateway knows nothing about PostgreSQL; it only
//! checks liveness and builds or runs in-container commands.

mod docker;

pub use docker::{parse_running_state, DockerRuntime};

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

use crate::error::ContainerError;
use crate::Result;

/// Output of a command run to completion inside a container
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit status of the command
    pub status: ExitStatus,
    /// Stdout followed by stderr
    pub output: Vec<u8>,
}

impl ExecOutput {
    /// Whether the command exited successfully
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Combined output as (lossy) UTF-8, trimmed
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).trim().to_string()
    }
}

/// Trait for container runtimes
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Succeeds only if the container exists and is running
    async fn verify_container(&self, name: &str) -> Result<()>;

    /// Build the process that runs `command` inside the container.
    ///
    /// `interactive` keeps the container-side stdin attached so that bytes
    /// written to the child's stdin reach the in-container process.
    fn command(&self, name: &str, command: &[String], interactive: bool) -> Command;

    /// Run `command` inside the container and wait for it.
    ///
    /// No timeout is applied; this blocks until the command exits.
    async fn exec(&self, name: &str, command: &[String]) -> Result<ExecOutput> {
        let mut cmd = self.command(name, command, false);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Executing in container {}: {}", name, command.join(" "));

        let out = cmd.output().await.map_err(|e| ContainerError::Runtime {
            binary: cmd.as_std().get_program().to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

        let mut output = out.stdout;
        output.extend_from_slice(&out.stderr);
        Ok(ExecOutput {
            status: out.status,
            output,
        })
    }
}
