//! Layered configuration: global defaults, per-site overrides, command-line flags
//!
//! Global defaults live in `<app>/config/kana.toml`, per-site overrides in
//! `<working>/.kana.toml`. Starting a site also saves its resolved settings to
//! `<site_dir>/.kana.toml`, so later commands on the same site see the flags it
//! was started with. [`Config::resolve`] folds the layers into one
//! [`SiteSettings`] value.

use crate::error::{Result, SiteError};
use crate::settings::{
    sanitize_site_name, validate_name, AdminCredentials, SiteKind, SiteSettings,
    DEFAULT_DIRECTORY, DEFAULT_PHP_VERSION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the global defaults under `<app>/config`
pub const APP_CONFIG_FILE: &str = "kana.toml";

/// File name of the per-site overrides in the working directory
pub const SITE_CONFIG_FILE: &str = ".kana.toml";

/// Where the tool keeps its own files and where it was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// `~/.config/kana` unless overridden
    pub app: PathBuf,
    pub working: PathBuf,
}

impl Directories {
    pub fn new(app: impl Into<PathBuf>, working: impl Into<PathBuf>) -> Self {
        Self {
            app: app.into(),
            working: working.into(),
        }
    }

    /// `~/.config/kana`
    pub fn default_app_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config").join("kana"))
            .ok_or_else(|| SiteError::config("could not determine the home directory"))
    }

    pub fn config_file(&self) -> PathBuf {
        self.app.join("config").join(APP_CONFIG_FILE)
    }

    pub fn site_config_file(&self) -> PathBuf {
        self.working.join(SITE_CONFIG_FILE)
    }

    pub fn site_directory(&self, name: &str) -> PathBuf {
        self.app.join("sites").join(name)
    }
}

/// Global defaults applied to every new site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_php")]
    pub php: String,

    #[serde(default, rename = "type")]
    pub kind: SiteKind,

    #[serde(default)]
    pub local: bool,

    #[serde(default)]
    pub phpmyadmin: bool,

    #[serde(default)]
    pub plugins: Vec<String>,

    #[serde(default)]
    pub admin: AdminCredentials,
}

fn default_php() -> String {
    DEFAULT_PHP_VERSION.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            php: default_php(),
            kind: SiteKind::default(),
            local: false,
            phpmyadmin: false,
            plugins: Vec::new(),
            admin: AdminCredentials::default(),
        }
    }
}

impl AppConfig {
    /// Load the global defaults, writing them out first if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            tracing::info!("[Config] Wrote default configuration to {:?}", path);
            return Ok(config);
        }

        let config: AppConfig = read_toml(path)?;
        tracing::debug!("[Config] Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_toml(path, self)
    }
}

/// Per-site overrides; unset fields fall back to [`AppConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub php: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SiteKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phpmyadmin: Option<bool>,

    /// Sub-path of the working directory holding the plugin or theme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminCredentials>,
}

impl SiteOverrides {
    /// Missing file means no overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let overrides: SiteOverrides = read_toml(path)?;
        tracing::debug!("[Config] Loaded site overrides from {:?}", path);
        Ok(overrides)
    }
}

/// Command-line flags; only flags that were given override the files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFlags {
    pub name: Option<String>,
    pub plugin: bool,
    pub theme: bool,
    pub local: bool,
    pub phpmyadmin: bool,
}

impl SiteFlags {
    fn kind(&self) -> Result<Option<SiteKind>> {
        match (self.plugin, self.theme) {
            (true, true) => Err(SiteError::config(
                "a site cannot be both a plugin and a theme",
            )),
            (true, false) => Ok(Some(SiteKind::Plugin)),
            (false, true) => Ok(Some(SiteKind::Theme)),
            (false, false) => Ok(None),
        }
    }
}

/// Loaded configuration layers for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub directories: Directories,
    pub app: AppConfig,
    pub site: SiteOverrides,
}

impl Config {
    pub fn load(directories: Directories) -> Result<Self> {
        let app = AppConfig::load(&directories.config_file())?;
        let site = SiteOverrides::load(&directories.site_config_file())?;
        Ok(Self {
            directories,
            app,
            site,
        })
    }

    /// Fold defaults, overrides and flags into validated settings.
    pub fn resolve(&self, flags: &SiteFlags) -> Result<SiteSettings> {
        let name = match &flags.name {
            Some(name) => name.trim().to_string(),
            None => self.default_site_name()?,
        };

        validate_name(&name)?;

        let site_directory = self.directories.site_directory(&name);
        let saved = SiteOverrides::load(&saved_settings_path(&site_directory))?;
        let site = &self.site;

        let mut settings =
            SiteSettings::new(name.as_str(), &self.directories.working, site_directory);

        // working-directory overrides > settings saved by the last start > globals
        settings.php = site
            .php
            .clone()
            .or(saved.php)
            .unwrap_or_else(|| self.app.php.clone());
        settings.kind = site.kind.or(saved.kind).unwrap_or(self.app.kind);
        settings.local = site.local.or(saved.local).unwrap_or(self.app.local);
        settings.phpmyadmin = site
            .phpmyadmin
            .or(saved.phpmyadmin)
            .unwrap_or(self.app.phpmyadmin);
        settings.admin = site
            .admin
            .clone()
            .or(saved.admin)
            .unwrap_or_else(|| self.app.admin.clone());
        settings.plugins = site
            .plugins
            .clone()
            .or(saved.plugins)
            .unwrap_or_else(|| self.app.plugins.clone());
        settings.custom_directory = site
            .directory
            .clone()
            .or(saved.directory)
            .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string());

        if let Some(kind) = flags.kind()? {
            settings.kind = kind;
        }
        if flags.local {
            settings.local = true;
        }
        if flags.phpmyadmin {
            settings.phpmyadmin = true;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn default_site_name(&self) -> Result<String> {
        let base = self
            .directories
            .working
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let name = sanitize_site_name(&base);
        if name.is_empty() {
            return Err(SiteError::config(format!(
                "cannot derive a site name from {:?}; pass --name",
                self.directories.working
            )));
        }
        Ok(name)
    }
}

/// `<site_dir>/.kana.toml`
pub fn saved_settings_path(site_directory: &Path) -> PathBuf {
    site_directory.join(SITE_CONFIG_FILE)
}

/// Remember the settings a site was started with.
pub fn save_site_settings(settings: &SiteSettings) -> Result<()> {
    write_toml(
        &saved_settings_path(&settings.site_directory),
        &overrides_from(settings),
    )
}

/// Write the resolved per-site values as a `.kana.toml` overrides file.
pub fn export_site_config(settings: &SiteSettings, path: &Path) -> Result<()> {
    write_toml(path, &overrides_from(settings))?;
    tracing::info!("[Config] Exported site configuration to {:?}", path);
    Ok(())
}

fn overrides_from(settings: &SiteSettings) -> SiteOverrides {
    SiteOverrides {
        php: Some(settings.php.clone()),
        kind: Some(settings.kind),
        local: Some(settings.local),
        phpmyadmin: Some(settings.phpmyadmin),
        directory: Some(settings.custom_directory.clone()),
        plugins: Some(settings.plugins.clone()),
        admin: Some(settings.admin.clone()),
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| SiteError::config(format!("failed to parse {:?}: {}", path, e)))
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = toml::to_string_pretty(value)
        .map_err(|e| SiteError::config(format!("failed to serialize {:?}: {}", path, e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
