//! In-container administration through one-shot wp-cli containers
//!
//! Core install failures are fatal. A plugin that fails to install is only a
//! warning and is reported back in [`ExtensionReport`].

use crate::error::{ProvisionError, Result};
use crate::mounts::resolve_mounts;
use crate::settings::SiteSettings;
use crate::stack::admin_command_spec;
use container::{ContainerRuntime, RunResult};
use serde::Deserialize;

/// Plugins bundled with WordPress itself; never install candidates.
pub const BUNDLED_PLUGINS: &[&str] = &["akismet", "hello"];

/// One row of `wp plugin list --format=json`
#[derive(Debug, Clone, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub update: String,
    #[serde(default)]
    pub version: String,
}

/// Outcome of installing the configured plugins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionReport {
    /// Installed and activated by this run
    pub installed: Vec<String>,
    /// Install command exited non-zero
    pub failed: Vec<String>,
}

impl ExtensionReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Runs administrative commands for one site.
pub struct Provisioner<'a> {
    settings: &'a SiteSettings,
    runtime: &'a dyn ContainerRuntime,
}

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl<'a> Provisioner<'a> {
    pub fn new(settings: &'a SiteSettings, runtime: &'a dyn ContainerRuntime) -> Self {
        Self { settings, runtime }
    }

    /// Run `wp --path=/var/www/html <args…>` in a one-shot container.
    pub async fn run_admin_command(&self, args: &[String]) -> Result<RunResult> {
        let app_dir = self.settings.app_directory();
        let mounts = resolve_mounts(self.settings, &app_dir)?;
        let spec = admin_command_spec(self.settings, mounts.admin, args);

        self.runtime.ensure_image(&spec.image).await?;

        tracing::debug!("[Provisioner] wp {}", args.join(" "));
        let result = self.runtime.run_and_remove(&spec).await?;
        Ok(result)
    }

    /// Install WordPress unless `wp core is-installed` already succeeds.
    ///
    /// Returns true when an install was performed.
    pub async fn install_wordpress(&self) -> Result<bool> {
        match self
            .run_admin_command(&command(&["core", "is-installed"]))
            .await
        {
            Ok(check) if check.success() => {
                tracing::debug!("[Provisioner] WordPress already installed");
                return Ok(false);
            }
            Ok(check) => {
                tracing::debug!(
                    "[Provisioner] core is-installed exited with {}",
                    check.exit_code
                );
            }
            Err(e) => {
                tracing::warn!("[Provisioner] Install check failed: {}", e);
            }
        }

        tracing::info!("[Provisioner] Finishing WordPress setup for {}", self.settings.name);

        let admin = &self.settings.admin;
        let install = vec![
            "core".to_string(),
            "install".to_string(),
            format!("--url={}", self.settings.url()),
            format!("--title={}", self.settings.site_title()),
            format!("--admin_user={}", admin.username),
            format!("--admin_password={}", admin.password),
            format!("--admin_email={}", admin.email),
        ];

        match self.run_admin_command(&install).await {
            Ok(result) if result.success() => Ok(true),
            Ok(result) => Err(ProvisionError::CoreInstall(format!(
                "wp core install exited with {}: {}",
                result.exit_code,
                result.output.trim()
            ))
            .into()),
            Err(e) => Err(ProvisionError::CoreInstall(e.to_string()).into()),
        }
    }

    /// Plugins currently installed, minus drop-ins, bundled plugins and the site itself.
    pub async fn installed_plugins(&self) -> Result<Vec<String>> {
        let result = self
            .run_admin_command(&command(&["plugin", "list", "--format=json"]))
            .await?;

        if !result.success() {
            return Err(ProvisionError::InvalidOutput(format!(
                "wp plugin list exited with {}",
                result.exit_code
            ))
            .into());
        }

        parse_plugin_list(&result.output, &self.settings.name)
    }

    /// Install and activate every configured plugin that is not installed yet.
    pub async fn install_default_extensions(&self) -> Result<ExtensionReport> {
        let mut report = ExtensionReport::default();
        if self.settings.plugins.is_empty() {
            return Ok(report);
        }

        let installed = self.installed_plugins().await?;

        for plugin in missing_extensions(&installed, &self.settings.plugins) {
            tracing::info!("[Provisioner] Installing plugin: {}", plugin);

            let result = self
                .run_admin_command(&command(&["plugin", "install", "--activate", plugin.as_str()]))
                .await?;

            if result.success() {
                report.installed.push(plugin);
            } else {
                tracing::warn!(
                    "[Provisioner] Unable to install plugin {} (exit {})",
                    plugin,
                    result.exit_code
                );
                report.failed.push(plugin);
            }
        }

        Ok(report)
    }
}

/// Parse `wp plugin list --format=json`, dropping entries that are never
/// install candidates.
pub fn parse_plugin_list(output: &str, site_name: &str) -> Result<Vec<String>> {
    // wp-cli may print PHP notices ahead of the JSON array; they can contain '[' too.
    let start = json_start(output)
        .ok_or_else(|| ProvisionError::InvalidOutput("no plugin list in output".to_string()))?;

    let plugins: Vec<PluginInfo> = serde_json::from_str(output[start..].trim())
        .map_err(|e| ProvisionError::InvalidOutput(format!("plugin list: {}", e)))?;

    Ok(plugins
        .into_iter()
        .filter(|p| p.status != "dropin")
        .filter(|p| p.name != site_name && !BUNDLED_PLUGINS.contains(&p.name.as_str()))
        .map(|p| p.name)
        .collect())
}

/// Byte offset of the first line that opens a JSON array.
fn json_start(output: &str) -> Option<usize> {
    let mut offset = 0;
    for line in output.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Desired plugins not yet installed, in desired order, without duplicates.
///
/// Bundled plugins are excluded even when listed as desired.
pub fn missing_extensions(installed: &[String], desired: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for plugin in desired {
        let plugin = plugin.trim();
        if plugin.is_empty()
            || BUNDLED_PLUGINS.contains(&plugin)
            || installed.iter().any(|p| p == plugin)
            || missing.iter().any(|p| p == plugin)
        {
            continue;
        }
        missing.push(plugin.to_string());
    }
    missing
}
