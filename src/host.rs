//! Host runtime abstraction.
//!
//! Everything the adapter needs from the mod-loader host is injected through
//! the types in this module: the resolved config directory, the environment
//! type, and a read-only view of the loaded extension registry. No ownership
//! crosses the boundary; the adapter only reads.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// Host environment type.
///
/// `Client` is the thin-client variant: the host has no authoritative native
/// protocol version of its own, which flips the adapter into proxy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Thin client without an authoritative server version.
    Client,
    /// Dedicated server owning its native version.
    Server,
}

/// A single author entry from a mod's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModAuthor {
    /// Author display name.
    pub name: String,
    /// Contact channels keyed by kind (e.g. "homepage", "email").
    /// Ordered map so snapshots serialize deterministically.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub contact: BTreeMap<String, String>,
}

impl ModAuthor {
    /// Create an author entry with no contact information.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: BTreeMap::new(),
        }
    }

    /// Add a contact channel.
    pub fn with_contact(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.contact.insert(kind.into(), value.into());
        self
    }
}

/// Metadata of one loaded host extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModMetadata {
    /// Stable identifier used for presence checks.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Version string as reported by the host.
    pub version: String,
    /// Declared authors.
    pub authors: Vec<ModAuthor>,
}

/// Read-only view of the host's loaded extensions.
///
/// Implemented by the host integration; the adapter never mutates through it.
pub trait ModRegistry: Send + Sync {
    /// Enumerate all loaded extensions with their metadata.
    fn mods(&self) -> Vec<ModMetadata>;

    /// Whether an extension with the given id is currently loaded.
    fn is_loaded(&self, id: &str) -> bool;

    /// Version string of a loaded extension, if present.
    fn mod_version(&self, id: &str) -> Option<String> {
        self.mods()
            .into_iter()
            .find(|m| m.id == id)
            .map(|m| m.version)
    }
}

/// In-memory registry over a fixed mod list.
///
/// Used by tests and by hosts that snapshot their mod set at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    mods: Vec<ModMetadata>,
}

impl StaticRegistry {
    /// Create a registry over the given mod list.
    pub fn new(mods: Vec<ModMetadata>) -> Self {
        Self { mods }
    }
}

impl ModRegistry for StaticRegistry {
    fn mods(&self) -> Vec<ModMetadata> {
        self.mods.clone()
    }

    fn is_loaded(&self, id: &str) -> bool {
        self.mods.iter().any(|m| m.id == id)
    }
}

/// Bundle of host facilities handed to the adapter at construction.
#[derive(Clone)]
pub struct HostServices {
    /// Host-resolved configuration directory root.
    pub config_dir: PathBuf,
    /// Environment type of the running host.
    pub environment: Environment,
    /// Read-only extension registry.
    pub registry: Arc<dyn ModRegistry>,
}

impl HostServices {
    /// Create a new host services bundle.
    pub fn new(
        config_dir: impl Into<PathBuf>,
        environment: Environment,
        registry: Arc<dyn ModRegistry>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment,
            registry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> StaticRegistry {
        StaticRegistry::new(vec![
            ModMetadata {
                id: "via-bridge".to_string(),
                name: "ViaBridge".to_string(),
                version: "0.4.2".to_string(),
                authors: vec![ModAuthor::new("creeper123123321")
                    .with_contact("homepage", "https://example.com")],
            },
            ModMetadata {
                id: "loader".to_string(),
                name: "Loader".to_string(),
                version: "0.15.0".to_string(),
                authors: vec![],
            },
        ])
    }

    #[test]
    fn test_registry_presence_check() {
        let registry = sample_registry();
        assert!(registry.is_loaded("via-bridge"));
        assert!(registry.is_loaded("loader"));
        assert!(!registry.is_loaded("optifine"));
    }

    #[test]
    fn test_registry_version_lookup() {
        let registry = sample_registry();
        assert_eq!(registry.mod_version("loader").as_deref(), Some("0.15.0"));
        assert_eq!(registry.mod_version("missing"), None);
    }

    #[test]
    fn test_author_contact_ordering() {
        let author = ModAuthor::new("a")
            .with_contact("homepage", "h")
            .with_contact("email", "e");
        let keys: Vec<&str> = author.contact.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["email", "homepage"]);
    }
}
