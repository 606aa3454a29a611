//! Logging sink handed to the embedded engine.
//!
//! The engine expects a named logger from its platform; this module bridges
//! that expectation onto `tracing`. The logger is constructed once by the
//! adapter and passed around explicitly, never held in global mutable state.

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Named logging sink forwarding to the `tracing` infrastructure.
#[derive(Debug, Clone)]
pub struct PlatformLogger {
    name: String,
}

impl PlatformLogger {
    /// Create a logger with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Display name reported to the engine.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Log an informational message.
    pub fn info(&self, message: &str) {
        tracing::info!(logger = %self.name, "{message}");
    }

    /// Log a warning.
    pub fn warn(&self, message: &str) {
        tracing::warn!(logger = %self.name, "{message}");
    }

    /// Log an error.
    pub fn error(&self, message: &str) {
        tracing::error!(logger = %self.name, "{message}");
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        tracing::debug!(logger = %self.name, "{message}");
    }
}

/// Initialize the tracing subscriber for host processes embedding the adapter.
///
/// Respects `RUST_LOG` when set, falling back to the provided level. Safe to
/// call at most once per process; returns an error if a subscriber is already
/// installed.
pub fn init_tracing(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    Registry::default()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
