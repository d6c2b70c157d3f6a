//! Container specifications for a site's stack
//!
//! Pure: builds specs from settings and resolved mounts, no I/O.

use crate::labels::Labels;
use crate::mounts::DOCUMENT_ROOT;
use crate::settings::SiteSettings;
use container::{ContainerSpec, Mount, PortSpec};

/// Network shared by every site and the reverse proxy
pub const NETWORK: &str = "kana";

pub const DATABASE_IMAGE: &str = "mariadb";
pub const PHPMYADMIN_IMAGE: &str = "phpmyadmin";
const WORDPRESS_IMAGE: &str = "wordpress";

const MYSQL_DATA_DIR: &str = "/var/lib/mysql";
const MYSQL_PORT: u16 = 3306;

const DB_NAME: &str = "wordpress";
const DB_USER: &str = "wordpress";
const DB_PASSWORD: &str = "wordpress";
const DB_ROOT_PASSWORD: &str = "password";

/// wp-cli executable prefixed to every one-shot command
pub const WP_CLI: &str = "wp";

/// Host prefix of the admin UI (`admin-<domain>`)
pub const ADMIN_UI_HOST_PREFIX: &str = "admin";

/// Logical services of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Database,
    WordPress,
    PhpMyAdmin,
    WordPressCli,
}

impl Service {
    /// Long-running services in start order.
    pub const STACK: [Service; 3] = [Service::Database, Service::WordPress, Service::PhpMyAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Database => "database",
            Service::WordPress => "wordpress",
            Service::PhpMyAdmin => "phpmyadmin",
            Service::WordPressCli => "wordpress_cli",
        }
    }

    /// `kana_<site>_<service>`
    pub fn container_name(&self, site: &str) -> String {
        format!("kana_{}_{}", site, self.as_str())
    }
}

/// Names of every long-running container a site may have, in start order.
pub fn container_names(settings: &SiteSettings) -> Vec<String> {
    Service::STACK
        .iter()
        .map(|service| service.container_name(&settings.name))
        .collect()
}

/// Ordered specs for the stack: database, WordPress, then phpMyAdmin if enabled.
pub fn build_stack(settings: &SiteSettings, runtime_mounts: Vec<Mount>) -> Vec<ContainerSpec> {
    let mut specs = vec![
        database_spec(settings),
        wordpress_spec(settings, runtime_mounts),
    ];

    if settings.phpmyadmin {
        specs.push(phpmyadmin_spec(settings));
    }

    specs
}

pub fn database_spec(settings: &SiteSettings) -> ContainerSpec {
    ContainerSpec::new(
        Service::Database.container_name(&settings.name),
        DATABASE_IMAGE,
    )
    .with_network(NETWORK)
    .with_env(vec![
        format!("MARIADB_ROOT_PASSWORD={}", DB_ROOT_PASSWORD),
        format!("MARIADB_DATABASE={}", DB_NAME),
        format!("MARIADB_USER={}", DB_USER),
        format!("MARIADB_PASSWORD={}", DB_PASSWORD),
    ])
    .with_labels(Labels::owned_by(&settings.name).build())
    .with_mounts(vec![Mount::bind(
        settings.database_directory(),
        MYSQL_DATA_DIR,
    )])
    .with_ports(vec![PortSpec::tcp(MYSQL_PORT)])
    .as_local_user(true)
}

pub fn wordpress_spec(settings: &SiteSettings, mounts: Vec<Mount>) -> ContainerSpec {
    let service = Service::WordPress;
    let labels = Labels::owned_by(&settings.name)
        .route(service.as_str(), &settings.name, &settings.domain)
        .build();

    ContainerSpec::new(
        service.container_name(&settings.name),
        wordpress_image(settings),
    )
    .with_network(NETWORK)
    .with_env(wordpress_env(settings))
    .with_labels(labels)
    .with_mounts(mounts)
    .as_local_user(true)
}

pub fn phpmyadmin_spec(settings: &SiteSettings) -> ContainerSpec {
    let service = Service::PhpMyAdmin;
    let labels = Labels::owned_by(&settings.name)
        .route(service.as_str(), &settings.name, &admin_ui_host(settings))
        .build();

    ContainerSpec::new(service.container_name(&settings.name), PHPMYADMIN_IMAGE)
        .with_network(NETWORK)
        .with_env(vec![
            format!("MYSQL_ROOT_PASSWORD={}", DB_ROOT_PASSWORD),
            format!("PMA_HOST={}", database_host(settings)),
            format!("PMA_USER={}", DB_USER),
            format!("PMA_PASSWORD={}", DB_PASSWORD),
        ])
        .with_labels(labels)
        .with_mounts(vec![Mount::bind(
            settings.database_directory(),
            MYSQL_DATA_DIR,
        )])
}

/// One-shot wp-cli container running `wp --path=<docroot> <args…>`.
///
/// Carries the ownership label but no routes; it never serves traffic.
pub fn admin_command_spec(
    settings: &SiteSettings,
    mounts: Vec<Mount>,
    args: &[String],
) -> ContainerSpec {
    let mut command = vec![WP_CLI.to_string(), format!("--path={}", DOCUMENT_ROOT)];
    command.extend(args.iter().cloned());

    ContainerSpec::new(
        Service::WordPressCli.container_name(&settings.name),
        wordpress_cli_image(settings),
    )
    .with_network(NETWORK)
    .with_env(wordpress_env(settings))
    .with_labels(Labels::owned_by(&settings.name).build())
    .with_mounts(mounts)
    .with_command(command)
    .as_local_user(true)
}

pub fn wordpress_image(settings: &SiteSettings) -> String {
    format!("{}:php{}", WORDPRESS_IMAGE, settings.php)
}

pub fn wordpress_cli_image(settings: &SiteSettings) -> String {
    format!("{}:cli-php{}", WORDPRESS_IMAGE, settings.php)
}

pub fn database_host(settings: &SiteSettings) -> String {
    Service::Database.container_name(&settings.name)
}

pub fn admin_ui_host(settings: &SiteSettings) -> String {
    format!("{}-{}", ADMIN_UI_HOST_PREFIX, settings.domain)
}

fn wordpress_env(settings: &SiteSettings) -> Vec<String> {
    vec![
        format!("WORDPRESS_DB_HOST={}", database_host(settings)),
        format!("WORDPRESS_DB_USER={}", DB_USER),
        format!("WORDPRESS_DB_PASSWORD={}", DB_PASSWORD),
        format!("WORDPRESS_DB_NAME={}", DB_NAME),
    ]
}
