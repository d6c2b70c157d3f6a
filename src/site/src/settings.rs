//! Resolved per-site settings
//!
//! One immutable [`SiteSettings`] value is built per invocation (see
//! `config::Config::resolve`) and passed explicitly to every component.

use crate::error::{Result, SiteError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parent domain of every site; a wildcard certificate covers it.
pub const SITE_DOMAIN_SUFFIX: &str = "sites.kana.li";

pub const DEFAULT_PHP_VERSION: &str = "7.4";

/// PHP versions with published `wordpress:php<v>` and `wordpress:cli-php<v>` images.
pub const PHP_VERSIONS: &[&str] = &["7.4", "8.0", "8.1", "8.2", "8.3"];

/// Sentinel for "no custom extension directory".
pub const DEFAULT_DIRECTORY: &str = ".";

/// What the working directory contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SiteKind {
    /// A plain WordPress install
    #[default]
    #[serde(rename = "site", alias = "standalone")]
    Standalone,
    #[serde(rename = "plugin")]
    Plugin,
    #[serde(rename = "theme")]
    Theme,
}

impl SiteKind {
    /// Directory under `wp-content` the working directory is mounted into.
    pub fn extension_dir(&self) -> Option<&'static str> {
        match self {
            SiteKind::Standalone => None,
            SiteKind::Plugin => Some("plugins"),
            SiteKind::Theme => Some("themes"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteKind::Standalone => "site",
            SiteKind::Plugin => "plugin",
            SiteKind::Theme => "theme",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteKind {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "site" | "standalone" => Ok(SiteKind::Standalone),
            "plugin" => Ok(SiteKind::Plugin),
            "theme" => Ok(SiteKind::Theme),
            other => Err(SiteError::config(format!(
                "invalid site type '{}' (expected site, plugin or theme)",
                other
            ))),
        }
    }
}

/// WordPress administrator account created on install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
            email: "admin@mykanasite.localhost".to_string(),
        }
    }
}

/// Fully resolved settings for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub name: String,
    /// PHP version tag of the runtime images
    pub php: String,
    pub kind: SiteKind,
    /// Directory the command was invoked from
    pub working_directory: PathBuf,
    /// Sub-path of the working directory holding the extension, `.` for none
    pub custom_directory: String,
    pub phpmyadmin: bool,
    /// Keep WordPress files in `<working>/wordpress` instead of the site directory
    pub local: bool,
    /// Private per-site storage (`<app>/sites/<name>`)
    pub site_directory: PathBuf,
    pub domain: String,
    pub admin: AdminCredentials,
    /// Plugins installed from wordpress.org after WordPress is set up
    pub plugins: Vec<String>,
}

impl SiteSettings {
    /// Settings with defaults for everything but the identity of the site.
    pub fn new(
        name: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        site_directory: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        Self {
            domain: site_domain(&name),
            name,
            php: DEFAULT_PHP_VERSION.to_string(),
            kind: SiteKind::Standalone,
            working_directory: working_directory.into(),
            custom_directory: DEFAULT_DIRECTORY.to_string(),
            phpmyadmin: false,
            local: false,
            site_directory: site_directory.into(),
            admin: AdminCredentials::default(),
            plugins: Vec::new(),
        }
    }

    /// Reject values that would produce unusable container specs.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        if !PHP_VERSIONS.contains(&self.php.as_str()) {
            return Err(SiteError::config(format!(
                "invalid PHP version '{}' (expected one of {})",
                self.php,
                PHP_VERSIONS.join(", ")
            )));
        }

        if self.domain.trim().is_empty() {
            return Err(SiteError::config("site domain must not be empty"));
        }

        Ok(())
    }

    pub fn url(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// Host directory holding the WordPress files.
    pub fn app_directory(&self) -> PathBuf {
        if self.local {
            self.working_directory.join("wordpress")
        } else {
            self.site_directory.join("app")
        }
    }

    pub fn database_directory(&self) -> PathBuf {
        self.site_directory.join("database")
    }

    /// A site started in local mode has a database directory but no `app/`.
    pub fn has_local_layout(&self) -> bool {
        self.database_directory().is_dir() && !self.site_directory.join("app").is_dir()
    }

    /// Custom extension sub-path, `None` when the working directory itself is used.
    pub fn custom_directory(&self) -> Option<&Path> {
        let trimmed = self.custom_directory.trim();
        if trimmed.is_empty() || trimmed == DEFAULT_DIRECTORY {
            None
        } else {
            Some(Path::new(trimmed))
        }
    }

    /// `Kana Development plugin: demo`
    pub fn site_title(&self) -> String {
        format!("Kana Development {}: {}", self.kind, self.name)
    }
}

pub fn site_domain(name: &str) -> String {
    format!("{}.{}", name, SITE_DOMAIN_SUFFIX)
}

/// Lowercase a directory name into something usable as a container and host name.
pub fn sanitize_site_name(raw: &str) -> String {
    let mapped: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let mut name = String::with_capacity(mapped.len());
    for c in mapped.chars() {
        if c == '-' && (name.is_empty() || name.ends_with('-')) {
            continue;
        }
        name.push(c);
    }
    name.trim_end_matches('-').to_string()
}

pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(SiteError::config(format!(
            "invalid site name '{}' (use lowercase letters, digits and '-')",
            name
        )))
    }
}
