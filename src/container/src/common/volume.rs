/// Container mount types
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the source is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    /// Host directory bound into the container
    #[default]
    Bind,
    /// Named runtime volume
    Volume,
}

impl MountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountType::Bind => "bind",
            MountType::Volume => "volume",
        }
    }
}

/// One mount of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// Source path on host (or volume name)
    pub source: PathBuf,

    /// Destination path in container
    pub target: PathBuf,

    #[serde(default)]
    pub mount_type: MountType,

    #[serde(default)]
    pub read_only: bool,
}

impl Mount {
    pub fn bind(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            mount_type: MountType::Bind,
            read_only: false,
        }
    }

    pub fn volume(name: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: name.into(),
            target: target.into(),
            mount_type: MountType::Volume,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Value for `docker run --mount`
    pub fn to_mount_arg(&self) -> String {
        let mut arg = format!(
            "type={},source={},target={}",
            self.mount_type.as_str(),
            self.source.display(),
            self.target.display()
        );
        if self.read_only {
            arg.push_str(",readonly");
        }
        arg
    }
}
