//! The platform contract and its adapter implementation.
//!
//! [`ViaPlatform`] is the fixed set of methods the embedded
//! protocol-translation engine requires from its host. [`PlatformAdapter`]
//! satisfies it by delegating to the injected [`HostServices`](crate::host::HostServices)
//! and the [`Scheduler`](crate::sched::Scheduler).

pub mod adapter;
pub mod api;
pub mod dump;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, EngineSettings};
use crate::logging::PlatformLogger;
use crate::sched::{RepeatingTaskFn, TaskFn, TaskHandle};

pub use adapter::PlatformAdapter;
pub use api::ApiHandle;
pub use dump::{build_dump, DiagnosticDump};
pub use version::{FixedVersionProvider, NativeVersionProvider, ProtocolVersion};

/// Platform contract consumed by the embedded engine.
///
/// Scheduling intervals are in host ticks. Implementations must uphold the
/// failure semantics documented on [`crate::sched`]: scheduled-task failures
/// surface through the returned handle and a single log line, never as a
/// panic into the engine.
pub trait ViaPlatform: Send + Sync {
    /// Named logging sink for engine output.
    fn logger(&self) -> &PlatformLogger;

    /// The adapter's configuration object.
    fn config(&self) -> &Config;

    /// Current settings snapshot. Safe to call from any thread.
    fn settings(&self) -> Arc<EngineSettings> {
        self.config().snapshot()
    }

    /// Engine-facing API handle.
    fn api(&self) -> &ApiHandle;

    /// Per-extension data directory.
    fn data_dir(&self) -> &Path;

    /// Name of this platform.
    fn platform_name(&self) -> &str;

    /// Version of this platform adapter.
    fn platform_version(&self) -> String;

    /// Version of the embedded engine as loaded by the host.
    fn plugin_version(&self) -> String;

    /// Whether the extension is enabled. The host guarantees it is loaded
    /// before any engine call, so this holds unconditionally.
    fn is_plugin_enabled(&self) -> bool {
        true
    }

    /// Whether the host acts as a proxy for version negotiation purposes.
    fn is_proxy(&self) -> bool;

    /// Whether the host may currently be reloading the extension. The host
    /// loader has no reload cycle.
    fn could_be_reloading(&self) -> bool {
        false
    }

    /// Hook invoked when the host reloads its resources. The adapter keeps
    /// no per-reload state, so the default does nothing.
    fn on_reload(&self) {}

    /// Build a fresh diagnostic snapshot of the host environment.
    fn dump(&self) -> DiagnosticDump;

    /// Whether an extension with the given id is loaded.
    fn has_extension(&self, id: &str) -> bool;

    /// Submit a task to the background pool.
    fn run_async(&self, task: TaskFn) -> TaskHandle;

    /// Run a task on the background pool at a fixed tick interval.
    fn run_repeating_async(&self, task: RepeatingTaskFn, interval_ticks: u64) -> TaskHandle;

    /// Run a task on the host event loop after a tick-based delay.
    fn run_delayed(&self, task: TaskFn, delay_ticks: u64) -> TaskHandle;

    /// Run a task on the host event loop at a fixed tick interval.
    fn run_repeating(&self, task: RepeatingTaskFn, interval_ticks: u64) -> TaskHandle;
}
