//! Docker CLI implementation of [`ContainerRuntime`].

use crate::common::{ContainerError, ContainerRuntime, ContainerSpec, ImageReference, RunResult};
use crate::docker::commands::{
    is_no_such_container, output_lines, run_args, RunMode, UserMapping, DOCKER_RUN_FAILURE,
};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;

/// Runtime client backed by the `docker` binary.
pub struct DockerCli {
    program: String,
    user: Option<UserMapping>,
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_program("docker")
    }

    /// Use a different CLI binary with a docker-compatible interface (e.g. `podman`).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            user: UserMapping::current(),
        }
    }

    async fn output(&self, args: &[String]) -> Result<Output, ContainerError> {
        tracing::debug!("[DockerCli] {} {}", self.program, args.join(" "));
        Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(ContainerError::Spawn)
    }

    /// Run and require a zero exit code.
    async fn checked(&self, args: &[String]) -> Result<String, ContainerError> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(self.failure(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn failure(&self, args: &[String], output: &Output) -> ContainerError {
        ContainerError::CommandFailed {
            command: format!(
                "{} {}",
                self.program,
                args.first().map(String::as_str).unwrap_or_default()
            ),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn ensure_network(&self, name: &str) -> Result<bool, ContainerError> {
        let inspect = self.output(&args(["network", "inspect", name])).await?;
        if inspect.status.success() {
            return Ok(false);
        }

        tracing::info!("[DockerCli] Creating network: {}", name);
        self.checked(&args(["network", "create", name])).await?;
        Ok(true)
    }

    async fn ensure_image(&self, reference: &str) -> Result<(), ContainerError> {
        let image = ImageReference::parse(reference)?;

        let inspect = self
            .output(&args(["image", "inspect", image.reference.as_str()]))
            .await?;
        if inspect.status.success() {
            tracing::debug!("[DockerCli] Image present: {}", image);
            return Ok(());
        }

        tracing::info!("[DockerCli] Pulling image: {}", image);
        self.checked(&args(["pull", image.reference.as_str()])).await?;
        Ok(())
    }

    async fn run_container(
        &self,
        spec: &ContainerSpec,
        background: bool,
    ) -> Result<String, ContainerError> {
        let mode = if background {
            RunMode::Detached
        } else {
            RunMode::Foreground
        };
        let run = run_args(spec, mode, self.user);

        tracing::info!(
            "[DockerCli] Starting container {} ({})",
            spec.name,
            spec.image
        );
        let stdout = self.checked(&run).await?;

        if background {
            Ok(stdout.trim().to_string())
        } else {
            Ok(spec.name.clone())
        }
    }

    async fn run_and_remove(&self, spec: &ContainerSpec) -> Result<RunResult, ContainerError> {
        let run = run_args(spec, RunMode::OneShot, self.user);
        let output = self.output(&run).await?;

        let code = output.status.code().unwrap_or(-1);
        if code == DOCKER_RUN_FAILURE {
            return Err(self.failure(&run, &output));
        }

        tracing::debug!(
            "[DockerCli] One-shot container {} exited with {}",
            spec.name,
            code
        );
        Ok(RunResult::new(
            i64::from(code),
            String::from_utf8_lossy(&output.stdout),
        ))
    }

    async fn stop_container(&self, name: &str) -> Result<bool, ContainerError> {
        let rm = args(["rm", "--force", name]);
        let output = self.output(&rm).await?;

        if output.status.success() {
            tracing::info!("[DockerCli] Removed container {}", name);
            return Ok(true);
        }

        if is_no_such_container(&String::from_utf8_lossy(&output.stderr)) {
            tracing::debug!("[DockerCli] Container {} already gone", name);
            return Ok(false);
        }

        Err(self.failure(&rm, &output))
    }

    async fn running_containers(
        &self,
        label: &str,
        value: &str,
    ) -> Result<Vec<String>, ContainerError> {
        let filter = format!("label={}={}", label, value);
        let stdout = self
            .checked(&args(["ps", "--filter", filter.as_str(), "--format", "{{.Names}}"]))
            .await?;
        Ok(output_lines(&stdout))
    }
}
