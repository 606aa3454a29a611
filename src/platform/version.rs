//! Native protocol version discovery.
//!
//! On a server host the native version is fixed by the running binary; on a
//! thin client it has to be discovered (or stays unknown). The discovery
//! mechanism is host-specific and installed into the adapter at
//! initialization.

use serde::Serialize;

/// Protocol version number as used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProtocolVersion(pub i32);

impl ProtocolVersion {
    /// Raw wire value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Host-specific discovery of the native protocol version.
pub trait NativeVersionProvider: Send + Sync {
    /// The version the host natively speaks, if known.
    fn native_protocol_version(&self) -> Option<ProtocolVersion>;
}

/// Provider over a version known at construction time.
#[derive(Debug, Clone, Copy)]
pub struct FixedVersionProvider {
    version: ProtocolVersion,
}

impl FixedVersionProvider {
    /// Create a provider reporting the given version.
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }
}

impl NativeVersionProvider for FixedVersionProvider {
    fn native_protocol_version(&self) -> Option<ProtocolVersion> {
        Some(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_provider_reports_its_version() {
        let provider = FixedVersionProvider::new(ProtocolVersion(763));
        assert_eq!(
            provider.native_protocol_version(),
            Some(ProtocolVersion(763))
        );
    }
}
