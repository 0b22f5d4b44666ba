//! Docker-compatible runtime driven through its CLI.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::ContainerRuntime;
use crate::config::RuntimeConfig;
use crate::error::ContainerError;
use crate::Result;

/// Runtime that shells out to `docker` (or any CLI-compatible binary such as
/// `podman`).
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    binary: String,
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl DockerRuntime {
    /// Create a runtime from configuration
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            binary: config.binary,
        }
    }

    /// Runtime binary this gateway invokes
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn exec_args(name: &str, command: &[String], interactive: bool) -> Vec<String> {
        let mut args = Vec::with_capacity(command.len() + 3);
        args.push("exec".to_string());
        if interactive {
            args.push("-i".to_string());
        }
        args.push(name.to_string());
        args.extend(command.iter().cloned());
        args
    }
}

/// Interpret the output of `inspect --format {{.State.Running}}`
pub fn parse_running_state(output: &str) -> bool {
    output.trim() == "true"
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn verify_container(&self, name: &str) -> Result<()> {
        debug!("Inspecting container {}", name);

        let out = Command::new(&self.binary)
            .args(["inspect", "--format={{.State.Running}}", name])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ContainerError::Runtime {
                binary: self.binary.clone(),
                message: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&out.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&out.stderr));

        if !out.status.success() {
            return Err(ContainerError::NotFound {
                name: name.to_string(),
                output: combined.trim().to_string(),
            }
            .into());
        }

        if !parse_running_state(&combined) {
            return Err(ContainerError::NotRunning {
                name: name.to_string(),
                state: combined.trim().to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn command(&self, name: &str, command: &[String], interactive: bool) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::exec_args(name, command, interactive));
        cmd
    }
}
