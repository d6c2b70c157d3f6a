//! Container runtime client for the kana site orchestrator.
//!
//! The orchestrator only ever talks to containers through the [`ContainerRuntime`]
//! trait defined in `common`. The `docker` module provides the production
//! implementation, which drives the `docker` binary one call at a time.

pub mod common;
pub use common::*;

pub mod docker;
pub use docker::DockerCli;
