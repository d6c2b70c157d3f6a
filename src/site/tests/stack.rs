mod support;

use site::labels::{router_keys, Labels, SITE_LABEL};
use site::mounts::resolve_mounts;
use site::stack::{admin_command_spec, build_stack, Service, NETWORK};
use site::SiteKind;
use std::collections::HashSet;
use tempfile::TempDir;

#[test]
fn test_stack_order_and_optional_phpmyadmin() {
    let tmp = TempDir::new().unwrap();
    let mut settings = support::settings(tmp.path(), "demo");

    let names: Vec<String> = build_stack(&settings, Vec::new())
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["kana_demo_database", "kana_demo_wordpress"]);

    settings.phpmyadmin = true;
    let specs = build_stack(&settings, Vec::new());
    assert_eq!(specs.len(), 3);
    assert_eq!(specs[2].name, "kana_demo_phpmyadmin");
    assert!(specs.iter().all(|s| s.network == NETWORK));
    assert!(specs
        .iter()
        .all(|s| s.labels.get(SITE_LABEL).map(String::as_str) == Some("demo")));
}

#[test]
fn test_images_follow_php_version() {
    let tmp = TempDir::new().unwrap();
    let mut settings = support::settings(tmp.path(), "demo");
    settings.php = "8.2".to_string();
    settings.phpmyadmin = true;

    let specs = build_stack(&settings, Vec::new());
    assert_eq!(specs[0].image, "mariadb");
    assert_eq!(specs[1].image, "wordpress:php8.2");
    assert_eq!(specs[2].image, "phpmyadmin");

    let cli = admin_command_spec(&settings, Vec::new(), &[]);
    assert_eq!(cli.image, "wordpress:cli-php8.2");
}

#[test]
fn test_router_keys_disjoint_between_services() {
    let tmp = TempDir::new().unwrap();
    let mut settings = support::settings(tmp.path(), "demo");
    settings.phpmyadmin = true;

    let specs = build_stack(&settings, Vec::new());
    let wordpress: HashSet<&str> = router_keys(&specs[1].labels).into_iter().collect();
    let phpmyadmin: HashSet<&str> = router_keys(&specs[2].labels).into_iter().collect();

    assert!(!wordpress.is_empty());
    assert!(!phpmyadmin.is_empty());
    assert!(wordpress.is_disjoint(&phpmyadmin));
    assert!(router_keys(&specs[0].labels).is_empty());

    let services = ["database", "wordpress", "phpmyadmin", "wordpress_cli"];
    for (i, a) in services.iter().enumerate() {
        for b in &services[i + 1..] {
            let ka = Labels::owned_by("demo").route(a, "demo", "a.test").build();
            let kb = Labels::owned_by("demo").route(b, "demo", "b.test").build();
            let ka: HashSet<&str> = router_keys(&ka).into_iter().collect();
            let kb: HashSet<&str> = router_keys(&kb).into_iter().collect();
            assert!(ka.is_disjoint(&kb), "{} and {} share a router key", a, b);
        }
    }
}

#[test]
fn test_routes_use_site_and_admin_hosts() {
    let tmp = TempDir::new().unwrap();
    let mut settings = support::settings(tmp.path(), "demo");
    settings.phpmyadmin = true;

    let specs = build_stack(&settings, Vec::new());
    let wp = &specs[1].labels;
    assert_eq!(
        wp.get("traefik.http.routers.wordpress-demo.rule")
            .map(String::as_str),
        Some("Host(`demo.sites.kana.li`)")
    );
    assert_eq!(
        wp.get("traefik.http.routers.wordpress-demo-http.entrypoints")
            .map(String::as_str),
        Some("web")
    );
    assert_eq!(
        wp.get("traefik.http.routers.wordpress-demo.tls")
            .map(String::as_str),
        Some("true")
    );

    let admin = &specs[2].labels;
    assert_eq!(
        admin
            .get("traefik.http.routers.phpmyadmin-demo.rule")
            .map(String::as_str),
        Some("Host(`admin-demo.sites.kana.li`)")
    );
}

#[test]
fn test_database_and_runtime_run_as_local_user() {
    let tmp = TempDir::new().unwrap();
    let mut settings = support::settings(tmp.path(), "demo");
    settings.phpmyadmin = true;

    let specs = build_stack(&settings, Vec::new());
    assert!(specs[0].local_user);
    assert!(specs[1].local_user);
    assert!(!specs[2].local_user);
    assert!(specs[0]
        .env
        .contains(&"MARIADB_DATABASE=wordpress".to_string()));
    assert!(specs[1]
        .env
        .contains(&"WORDPRESS_DB_HOST=kana_demo_database".to_string()));
}

#[test]
fn test_admin_command_spec() {
    let tmp = TempDir::new().unwrap();
    let mut settings = support::settings(tmp.path(), "demo");
    settings.kind = SiteKind::Plugin;

    let app_dir = settings.app_directory();
    let mounts = resolve_mounts(&settings, &app_dir).unwrap();
    let args = vec!["plugin".to_string(), "list".to_string()];
    let spec = admin_command_spec(&settings, mounts.admin.clone(), &args);

    assert_eq!(spec.name, Service::WordPressCli.container_name("demo"));
    assert_eq!(spec.command, vec!["wp", "--path=/var/www/html", "plugin", "list"]);
    assert_eq!(spec.mounts, mounts.admin);
    assert!(spec.local_user);
    assert!(router_keys(&spec.labels).is_empty());
    assert_eq!(spec.labels.get(SITE_LABEL).map(String::as_str), Some("demo"));
}
