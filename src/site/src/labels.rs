//! Container labels read by the reverse proxy and by status queries
//!
//! Every router key embeds the logical service name, so two services of the
//! same site never write the same key.

use std::collections::BTreeMap;

/// Ownership label; its value is the site name.
pub const SITE_LABEL: &str = "kana.site";

pub const PROXY_ENABLE_LABEL: &str = "traefik.enable";

const ROUTER_PREFIX: &str = "traefik.http.routers";

/// Proxy entrypoint for plain HTTP
pub const HTTP_ENTRYPOINT: &str = "web";

/// Proxy entrypoint for TLS
pub const HTTPS_ENTRYPOINT: &str = "websecure";

/// Router name: `<service>-<site>` for TLS, `<service>-<site>-http` for plain HTTP.
pub fn router_name(service: &str, site: &str, secure: bool) -> String {
    if secure {
        format!("{}-{}", service, site)
    } else {
        format!("{}-{}-http", service, site)
    }
}

fn router_key(service: &str, site: &str, secure: bool, field: &str) -> String {
    format!(
        "{}.{}.{}",
        ROUTER_PREFIX,
        router_name(service, site, secure),
        field
    )
}

/// Builder for one container's label map.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    labels: BTreeMap<String, String>,
}

impl Labels {
    /// Labels tagging a container as owned by `site`.
    pub fn owned_by(site: &str) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(SITE_LABEL.to_string(), site.to_string());
        Self { labels }
    }

    /// Route `host` to this container on both entrypoints.
    pub fn route(mut self, service: &str, site: &str, host: &str) -> Self {
        let rule = format!("Host(`{}`)", host);

        self.labels
            .insert(PROXY_ENABLE_LABEL.to_string(), "true".to_string());

        self.labels.insert(
            router_key(service, site, false, "entrypoints"),
            HTTP_ENTRYPOINT.to_string(),
        );
        self.labels
            .insert(router_key(service, site, false, "rule"), rule.clone());

        self.labels.insert(
            router_key(service, site, true, "entrypoints"),
            HTTPS_ENTRYPOINT.to_string(),
        );
        self.labels.insert(router_key(service, site, true, "rule"), rule);
        self.labels
            .insert(router_key(service, site, true, "tls"), "true".to_string());

        self
    }

    pub fn build(self) -> BTreeMap<String, String> {
        self.labels
    }
}

/// Router keys present in a label map.
pub fn router_keys(labels: &BTreeMap<String, String>) -> Vec<&str> {
    let prefix = format!("{}.", ROUTER_PREFIX);
    labels
        .keys()
        .filter(|key| key.starts_with(&prefix))
        .map(String::as_str)
        .collect()
}
