//! Mount resolution for the WordPress containers
use crate::error::Result;
use crate::settings::SiteSettings;
use container::Mount;
use std::path::{Path, PathBuf};

/// WordPress document root inside the runtime and CLI images
pub const DOCUMENT_ROOT: &str = "/var/www/html";

/// Scratch path for database import/export files
pub const SITE_SCRATCH_PATH: &str = "/Site";

const DIR_MODE: u32 = 0o750;

/// Mount sets for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMounts {
    /// Mounts of the long-running WordPress container
    pub runtime: Vec<Mount>,
    /// Mounts of one-shot wp-cli containers
    pub admin: Vec<Mount>,
}

/// Compute the bind mounts for a site whose WordPress files live in `app_dir`.
///
/// For plugin and theme sites the nested `wp-content/<plugins|themes>/<name>`
/// directory is created on the host first. If the container created it, it
/// would be owned by root instead of the invoking user.
pub fn resolve_mounts(settings: &SiteSettings, app_dir: &Path) -> Result<SiteMounts> {
    let mut mounts = vec![
        Mount::bind(app_dir, DOCUMENT_ROOT),
        Mount::bind(&settings.site_directory, SITE_SCRATCH_PATH),
    ];

    if let Some(extension_dir) = settings.kind.extension_dir() {
        let host_nested = app_dir
            .join("wp-content")
            .join(extension_dir)
            .join(&settings.name);
        create_private_dir(&host_nested)?;

        let source = match settings.custom_directory() {
            Some(sub_path) => {
                let source = settings
                    .working_directory
                    .join(sub_path)
                    .join(&settings.name);
                create_private_dir(&source)?;
                source
            }
            None => settings.working_directory.clone(),
        };

        let target = extension_target(settings, extension_dir);
        tracing::debug!(
            "[MountResolver] {} {} -> {}",
            settings.kind,
            source.display(),
            target.display()
        );
        mounts.push(Mount::bind(source, target));
    }

    Ok(SiteMounts {
        admin: mounts.clone(),
        runtime: mounts,
    })
}

/// `/var/www/html/wp-content/<plugins|themes>/<name>`
pub fn extension_target(settings: &SiteSettings, extension_dir: &str) -> PathBuf {
    Path::new(DOCUMENT_ROOT)
        .join("wp-content")
        .join(extension_dir)
        .join(&settings.name)
}

/// Create a directory (and parents) readable only by the owner and group.
pub fn create_private_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    #[cfg(not(unix))]
    let _ = DIR_MODE;
    builder.create(path)
}
