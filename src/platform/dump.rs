//! Diagnostic dump generation.
//!
//! A dump is an ephemeral, read-only snapshot of the host environment built
//! fresh on every request: every loaded mod with its metadata and authors,
//! plus the discovered native protocol version. Building one mutates
//! nothing, so two dumps taken with unchanged host state compare equal.

use serde::Serialize;

use crate::error::Result;
use crate::host::{ModMetadata, ModRegistry};

use super::version::ProtocolVersion;

/// Structured snapshot handed to the engine's support tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticDump {
    /// All loaded host extensions, sorted by id.
    pub mods: Vec<ModMetadata>,
    /// Discovered native protocol version, when a provider is installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_version: Option<ProtocolVersion>,
}

impl DiagnosticDump {
    /// Render the snapshot as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Build a dump from the registry and the optional native version.
pub fn build_dump(
    registry: &dyn ModRegistry,
    native_version: Option<ProtocolVersion>,
) -> DiagnosticDump {
    let mut mods = registry.mods();
    // Registry enumeration order is host-defined; sort for stable snapshots.
    mods.sort_by(|a, b| a.id.cmp(&b.id));

    DiagnosticDump {
        mods,
        native_version,
    }
}
