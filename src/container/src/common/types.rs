/// Container-specific types
use crate::common::Mount;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Port exposed by a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

impl PortSpec {
    pub fn tcp(port: u16) -> Self {
        Self {
            port,
            protocol: default_protocol(),
        }
    }
}

/// Everything the runtime needs to create one container.
///
/// Specs are built once per run and consumed by value; the runtime never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Container name, also its identity for stop/remove
    pub name: String,

    /// Image reference (e.g., "wordpress:php8.1")
    pub image: String,

    /// Network the container joins
    pub network: String,

    /// Hostname on that network
    pub hostname: String,

    /// Command override, empty to use the image default
    #[serde(default)]
    pub command: Vec<String>,

    /// Environment variables (KEY=VALUE format)
    #[serde(default)]
    pub env: Vec<String>,

    /// Labels, kept ordered so generated arguments are stable
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub mounts: Vec<Mount>,

    #[serde(default)]
    pub ports: Vec<PortSpec>,

    /// Run as the invoking user's uid/gid instead of the image default
    #[serde(default)]
    pub local_user: bool,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            hostname: name.clone(),
            name,
            image: image.into(),
            network: String::new(),
            command: Vec::new(),
            env: Vec::new(),
            labels: BTreeMap::new(),
            mounts: Vec::new(),
            ports: Vec::new(),
            local_user: false,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_mounts(mut self, mounts: Vec<Mount>) -> Self {
        self.mounts = mounts;
        self
    }

    pub fn with_ports(mut self, ports: Vec<PortSpec>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn as_local_user(mut self, local_user: bool) -> Self {
        self.local_user = local_user;
        self
    }
}

/// Result of a one-shot container run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Exit code of the command inside the container
    pub exit_code: i64,

    /// Captured standard output
    pub output: String,
}

impl RunResult {
    pub fn new(exit_code: i64, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Container runtime operations used by the orchestrator.
///
/// Calls are awaited one at a time; implementations must not assume any
/// concurrency from the caller.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create the network if missing. Returns true when it had to be created.
    async fn ensure_network(&self, name: &str) -> Result<bool, ContainerError>;

    /// Pull the image unless it is already present locally.
    async fn ensure_image(&self, reference: &str) -> Result<(), ContainerError>;

    /// Create and start a container, returning its id.
    async fn run_container(
        &self,
        spec: &ContainerSpec,
        background: bool,
    ) -> Result<String, ContainerError>;

    /// Run a container to completion, capture its output and remove it.
    async fn run_and_remove(&self, spec: &ContainerSpec) -> Result<RunResult, ContainerError>;

    /// Stop and remove a container. `Ok(false)` when no such container exists.
    async fn stop_container(&self, name: &str) -> Result<bool, ContainerError>;

    /// Names of running containers carrying `label=value`.
    async fn running_containers(
        &self,
        label: &str,
        value: &str,
    ) -> Result<Vec<String>, ContainerError>;
}

/// Container-specific error type
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Container not found: {0}")]
    NotFound(String),

    #[error("Invalid image reference: {0}")]
    InvalidImage(String),

    #[error("`{command}` failed (exit {code}): {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to spawn runtime command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContainerError {
    /// True when the error only says the container is already gone.
    pub fn is_not_found(&self) -> bool {
        match self {
            ContainerError::NotFound(_) => true,
            ContainerError::CommandFailed { stderr, .. } => stderr.contains("No such container"),
            _ => false,
        }
    }
}
