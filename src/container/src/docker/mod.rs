//! Docker CLI runtime client
//!
//! Drives the `docker` binary. Argument construction lives in `commands` so it
//! can be tested without a daemon.

pub mod commands;
pub mod runtime;

pub use commands::{run_args, RunMode, UserMapping};
pub use runtime::DockerCli;
