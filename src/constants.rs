//! Domain constants for the platform adapter.
//!
//! Compile-time constants, separated from runtime configuration to provide a
//! clear distinction between values that never change and those that can be
//! configured.

/// Tick timing constants.
pub mod tick {
    use std::time::Duration;

    /// Real-time duration of one host simulation tick.
    pub const TICK_DURATION: Duration = Duration::from_millis(50);

    /// Host tick rate in ticks per second.
    pub const TICKS_PER_SECOND: u64 = 20;
}

/// File system constants.
pub mod fs {
    /// Name of the per-extension data directory under the host config directory.
    pub const DATA_DIR_NAME: &str = "via-bridge";

    /// Fixed name of the engine configuration file inside the data directory.
    pub const CONFIG_FILE_NAME: &str = "engine.yml";
}

/// Platform identity constants.
pub mod platform {
    /// Name the adapter reports to the embedded engine.
    pub const PLATFORM_NAME: &str = "ViaBridge";

    /// Mod id of the adapter itself in the host registry.
    pub const BRIDGE_MOD_ID: &str = "via-bridge";

    /// Mod id of the embedded protocol-translation engine.
    pub const ENGINE_MOD_ID: &str = "via-engine";

    /// Version string reported when the registry has no entry for a mod.
    pub const UNKNOWN_VERSION: &str = "UNKNOWN";

    /// Version of the engine-facing API surface.
    pub const API_VERSION: u32 = 1;
}
