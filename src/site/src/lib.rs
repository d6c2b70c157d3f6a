//! Kana site orchestrator
//!
//! Turns a resolved [`SiteSettings`] snapshot into container operations for one
//! local WordPress stack: a database, the WordPress runtime and an optional
//! phpMyAdmin, routed by the shared reverse proxy through container labels.
//!
//! Data flows one way: settings → [`mounts`] → [`stack`] → [`lifecycle`] → the
//! container runtime, with [`provision`] running once the stack is up.

pub mod config;
pub mod error;
pub mod labels;
pub mod lifecycle;
pub mod mounts;
pub mod provision;
pub mod settings;
pub mod stack;

pub use config::{AppConfig, Config, Directories, SiteFlags, SiteOverrides};
pub use error::{ProvisionError, Result, SiteError};
pub use lifecycle::{SiteController, SiteState, StopOutcome, StopReport};
pub use provision::{ExtensionReport, Provisioner};
pub use settings::{AdminCredentials, SiteKind, SiteSettings};
