//! Tests for image reference parsing.

use container::ImageReference;

#[test]
fn test_bare_name_defaults_to_latest() {
    let image = ImageReference::parse("mariadb").unwrap();
    assert_eq!(image.name, "mariadb");
    assert_eq!(image.tag, "latest");
    assert!(image.registry.is_none());
}

#[test]
fn test_name_and_tag() {
    let image = ImageReference::parse("wordpress:cli-php8.1").unwrap();
    assert_eq!(image.name, "wordpress");
    assert_eq!(image.tag, "cli-php8.1");
    assert_eq!(image.to_string(), "wordpress:cli-php8.1");
}

#[test]
fn test_registry_with_port_is_not_a_tag() {
    let image = ImageReference::parse("localhost:5000/team/wordpress").unwrap();
    assert_eq!(image.registry.as_deref(), Some("localhost:5000"));
    assert_eq!(image.name, "team/wordpress");
    assert_eq!(image.tag, "latest");
}

#[test]
fn test_registry_host() {
    let image = ImageReference::parse("ghcr.io/acme/phpmyadmin:5").unwrap();
    assert_eq!(image.registry.as_deref(), Some("ghcr.io"));
    assert_eq!(image.name, "acme/phpmyadmin");
    assert_eq!(image.tag, "5");
}

#[test]
fn test_docker_hub_namespace_is_not_a_registry() {
    let image = ImageReference::parse("library/wordpress:php7.4").unwrap();
    assert!(image.registry.is_none());
    assert_eq!(image.name, "library/wordpress");
}

#[test]
fn test_invalid_references() {
    assert!(ImageReference::parse("").is_err());
    assert!(ImageReference::parse("word press").is_err());
    assert!(ImageReference::parse("wordpress:").is_err());
}
