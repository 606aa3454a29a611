//! Engine-facing API handle.
//!
//! The embedded engine receives one [`ApiHandle`] through the platform
//! contract and uses it for version introspection. The handle shares the
//! version-provider slot with the adapter, so a provider installed after
//! construction is visible here too.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::constants::platform::API_VERSION;

use super::version::{NativeVersionProvider, ProtocolVersion};

/// Write-once slot holding the installed native version provider.
pub(crate) type VersionSlot = Arc<OnceCell<Arc<dyn NativeVersionProvider>>>;

/// Thin accessor the engine uses for version queries.
#[derive(Clone)]
pub struct ApiHandle {
    versions: VersionSlot,
}

impl ApiHandle {
    pub(crate) fn new(versions: VersionSlot) -> Self {
        Self { versions }
    }

    /// Version of the API surface itself.
    pub fn api_version(&self) -> u32 {
        API_VERSION
    }

    /// Native protocol version, when a provider has been installed and knows
    /// one.
    pub fn native_protocol_version(&self) -> Option<ProtocolVersion> {
        self.versions
            .get()
            .and_then(|provider| provider.native_protocol_version())
    }
}
