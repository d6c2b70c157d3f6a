//! Site lifecycle: absent → running ⇄ stopped → absent
//!
//! Transitions only happen on explicit start/stop/destroy calls. Runtime calls
//! are awaited one at a time, so the database container is always launched
//! before the WordPress container.

use crate::config::save_site_settings;
use crate::error::{Result, SiteError};
use crate::labels::SITE_LABEL;
use crate::mounts::{create_private_dir, resolve_mounts};
use crate::provision::{ExtensionReport, Provisioner};
use crate::settings::SiteSettings;
use crate::stack::{build_stack, container_names, NETWORK};
use container::{ContainerError, ContainerRuntime, RunResult};
use std::fmt;
use std::sync::Arc;

/// Observed state of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteState {
    /// No site directory on disk
    Absent,
    Running,
    /// Site directory exists but none of its containers are running
    Stopped,
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SiteState::Absent => "absent",
            SiteState::Running => "running",
            SiteState::Stopped => "stopped",
        })
    }
}

/// Result of stopping one container.
#[derive(Debug)]
pub struct StopOutcome {
    pub name: String,
    /// `Ok(true)` removed, `Ok(false)` already gone
    pub result: std::result::Result<bool, ContainerError>,
}

impl StopOutcome {
    /// A "no such container" error is not a failure.
    pub fn is_failure(&self) -> bool {
        matches!(&self.result, Err(e) if !e.is_not_found())
    }
}

/// Per-container outcomes of a stop, in stop order.
#[derive(Debug, Default)]
pub struct StopReport {
    pub outcomes: Vec<StopOutcome>,
}

impl StopReport {
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(StopOutcome::is_failure)
    }

    /// Names of containers that were actually removed.
    pub fn removed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(true)))
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Escalate the first real failure, if any.
    pub fn into_result(mut self) -> Result<()> {
        match self.outcomes.iter().position(StopOutcome::is_failure) {
            Some(index) => match self.outcomes.swap_remove(index).result {
                Err(e) => Err(SiteError::Runtime(e)),
                Ok(_) => Ok(()),
            },
            None => Ok(()),
        }
    }
}

/// Drives one site through its lifecycle.
pub struct SiteController {
    settings: SiteSettings,
    runtime: Arc<dyn ContainerRuntime>,
}

impl SiteController {
    /// Fails with a configuration error before any container operation.
    ///
    /// A site whose files were created in local mode stays local even when
    /// the flag is not passed again.
    pub fn new(mut settings: SiteSettings, runtime: Arc<dyn ContainerRuntime>) -> Result<Self> {
        settings.validate()?;

        if !settings.local && settings.has_local_layout() {
            tracing::debug!(
                "[SiteController] {} was started with local files",
                settings.name
            );
            settings.local = true;
        }

        Ok(Self { settings, runtime })
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// The site directory is the only record that a site exists.
    pub fn exists(&self) -> bool {
        self.settings.site_directory.is_dir()
    }

    pub async fn is_site_running(&self) -> Result<bool> {
        let running = self
            .runtime
            .running_containers(SITE_LABEL, &self.settings.name)
            .await?;
        Ok(!running.is_empty())
    }

    pub async fn state(&self) -> Result<SiteState> {
        if !self.exists() {
            return Ok(SiteState::Absent);
        }

        if self.is_site_running().await? {
            Ok(SiteState::Running)
        } else {
            Ok(SiteState::Stopped)
        }
    }

    /// Create storage, then run database, WordPress and (optionally) phpMyAdmin.
    ///
    /// A failed run aborts the sequence and leaves already started
    /// containers in place.
    pub async fn start_site(&self) -> Result<()> {
        let name = &self.settings.name;

        if self.state().await? == SiteState::Running {
            return Err(SiteError::AlreadyRunning(name.clone()));
        }

        let app_dir = self.settings.app_directory();
        create_private_dir(&self.settings.site_directory)?;
        create_private_dir(&app_dir)?;
        create_private_dir(&self.settings.database_directory())?;
        save_site_settings(&self.settings)?;

        if self.settings.local {
            let wp_config = app_dir.join("wp-config.php");
            if wp_config.exists() {
                tracing::debug!("[SiteController] Removing stale {}", wp_config.display());
                std::fs::remove_file(&wp_config)?;
            }
        }

        let mounts = resolve_mounts(&self.settings, &app_dir)?;
        let specs = build_stack(&self.settings, mounts.runtime);

        if self.runtime.ensure_network(NETWORK).await? {
            tracing::info!("[SiteController] Created network {}", NETWORK);
        }

        for spec in &specs {
            self.runtime.ensure_image(&spec.image).await?;
        }

        for spec in &specs {
            // Leftovers from an abnormal exit would collide on the name.
            if self.runtime.stop_container(&spec.name).await? {
                tracing::warn!("[SiteController] Replaced stale container {}", spec.name);
            }

            let id = self.runtime.run_container(spec, true).await?;
            tracing::info!("[SiteController] Started {} ({})", spec.name, id);
        }

        tracing::info!("[SiteController] Site {} is running at {}", name, self.settings.url());
        Ok(())
    }

    /// Stop and remove every container of the site.
    ///
    /// Absent and stopped sites return an empty report. Each container is
    /// attempted even if an earlier one failed.
    pub async fn stop_site(&self) -> Result<StopReport> {
        match self.state().await? {
            SiteState::Running => Ok(self.stop_containers().await),
            state => {
                tracing::debug!(
                    "[SiteController] Site {} is {}; nothing to stop",
                    self.settings.name,
                    state
                );
                Ok(StopReport::default())
            }
        }
    }

    async fn stop_containers(&self) -> StopReport {
        let mut report = StopReport::default();

        for name in container_names(&self.settings) {
            let result = self.runtime.stop_container(&name).await;
            match &result {
                Ok(true) => tracing::info!("[SiteController] Stopped {}", name),
                Ok(false) => tracing::debug!("[SiteController] {} was not running", name),
                Err(e) if e.is_not_found() => {
                    tracing::debug!("[SiteController] {} was not running", name)
                }
                Err(e) => tracing::warn!("[SiteController] Failed to stop {}: {}", name, e),
            }
            report.outcomes.push(StopOutcome { name, result });
        }

        report
    }

    /// Stop containers best-effort, then always remove the site directory.
    pub async fn destroy_site(&self) -> Result<()> {
        if !self.exists() {
            tracing::debug!("[SiteController] Site {} does not exist", self.settings.name);
            return Ok(());
        }

        let running = match self.is_site_running().await {
            Ok(running) => running,
            Err(e) => {
                tracing::warn!("[SiteController] Could not query site state: {}", e);
                true
            }
        };

        if running {
            let report = self.stop_containers().await;
            if report.has_failures() {
                tracing::warn!(
                    "[SiteController] Some containers of {} could not be stopped",
                    self.settings.name
                );
            }
        }

        std::fs::remove_dir_all(&self.settings.site_directory)?;
        tracing::info!("[SiteController] Destroyed site {}", self.settings.name);
        Ok(())
    }

    pub fn provisioner(&self) -> Provisioner<'_> {
        Provisioner::new(&self.settings, self.runtime.as_ref())
    }

    pub async fn install_wordpress(&self) -> Result<bool> {
        self.provisioner().install_wordpress().await
    }

    pub async fn install_default_extensions(&self) -> Result<ExtensionReport> {
        self.provisioner().install_default_extensions().await
    }

    pub async fn run_admin_command(&self, args: &[String]) -> Result<RunResult> {
        self.provisioner().run_admin_command(args).await
    }
}
