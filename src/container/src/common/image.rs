/// Image reference types
use crate::common::ContainerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Full image reference as given (e.g., "ghcr.io/acme/wordpress:php8.1")
    pub reference: String,

    /// Registry host, when the first path segment names one
    pub registry: Option<String>,

    /// Image name (without registry)
    pub name: String,

    /// Tag (defaults to "latest")
    pub tag: String,
}

impl ImageReference {
    /// Parse image reference string
    pub fn parse(reference: &str) -> Result<Self, ContainerError> {
        let reference = reference.trim();
        if reference.is_empty() || reference.chars().any(char::is_whitespace) {
            return Err(ContainerError::InvalidImage(reference.to_string()));
        }

        // A ':' after the last '/' is a tag; before it, a registry port.
        let last_segment = reference.rsplit('/').next().unwrap_or(reference);
        let (name_part, tag) = match last_segment.rsplit_once(':') {
            Some((_, tag)) if !tag.is_empty() => {
                let cut = reference.len() - tag.len() - 1;
                (&reference[..cut], tag.to_string())
            }
            Some(_) => return Err(ContainerError::InvalidImage(reference.to_string())),
            None => (reference, "latest".to_string()),
        };

        let (registry, name) = match name_part.split_once('/') {
            Some((reg, img)) if reg.contains('.') || reg.contains(':') || reg == "localhost" => {
                (Some(reg.to_string()), img.to_string())
            }
            _ => (None, name_part.to_string()),
        };

        if name.is_empty() {
            return Err(ContainerError::InvalidImage(reference.to_string()));
        }

        Ok(Self {
            reference: reference.to_string(),
            registry,
            name,
            tag,
        })
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}
