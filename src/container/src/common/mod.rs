pub mod image;
/// Container-specific types and traits
///
/// Value objects handed from the orchestrator to the runtime client, plus the
/// runtime contract itself.
pub mod types;
pub mod volume;

pub use image::ImageReference;
pub use types::{ContainerError, ContainerRuntime, ContainerSpec, PortSpec, RunResult};
pub use volume::{Mount, MountType};
