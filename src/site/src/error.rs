//! Orchestrator error types
use container::ContainerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SiteError>;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Container runtime error: {0}")]
    Runtime(#[from] ContainerError),

    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Site {0} is already running; stop it before starting it again")]
    AlreadyRunning(String),
}

/// Failures of the in-container administrative steps.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Installation of WordPress failed: {0}")]
    CoreInstall(String),

    #[error("Unexpected command output: {0}")]
    InvalidOutput(String),
}

impl SiteError {
    pub fn config(message: impl Into<String>) -> Self {
        SiteError::Config(message.into())
    }
}
