//! Concrete platform adapter bound to a host.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::Config;
use crate::constants::{fs as fs_constants, platform as platform_constants};
use crate::error::{PlatformError, Result};
use crate::host::{Environment, HostServices};
use crate::logging::PlatformLogger;
use crate::sched::{RepeatingTaskFn, Scheduler, TaskFn, TaskHandle};

use super::api::{ApiHandle, VersionSlot};
use super::dump::{build_dump, DiagnosticDump};
use super::version::{NativeVersionProvider, ProtocolVersion};
use super::ViaPlatform;

/// Adapter instance implementing the platform contract for one host.
///
/// Owns exactly one [`Config`], bound to the fixed file name inside the
/// per-extension data directory.
pub struct PlatformAdapter {
    logger: PlatformLogger,
    host: HostServices,
    scheduler: Arc<Scheduler>,
    config: Config,
    data_dir: PathBuf,
    api: ApiHandle,
    versions: VersionSlot,
}

impl PlatformAdapter {
    /// Initialize the adapter against the host.
    ///
    /// Resolves the host's configuration directory, creates the adapter's
    /// data directory beneath it, and constructs the configuration object.
    /// Fails fatally if the directory cannot be resolved or created.
    pub fn initialize(host: HostServices, scheduler: Arc<Scheduler>) -> Result<Self> {
        if host.config_dir.as_os_str().is_empty() {
            return Err(PlatformError::Init(
                "host configuration directory is unavailable".to_string(),
            ));
        }

        let data_dir = host.config_dir.join(fs_constants::DATA_DIR_NAME);
        fs::create_dir_all(&data_dir).map_err(|e| {
            PlatformError::Init(format!(
                "cannot create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let config = Config::load(data_dir.join(fs_constants::CONFIG_FILE_NAME))?;
        let versions: VersionSlot = Arc::new(OnceCell::new());

        info!(data_dir = %data_dir.display(), "platform adapter initialized");

        Ok(Self {
            logger: PlatformLogger::new(platform_constants::PLATFORM_NAME),
            host,
            scheduler,
            config,
            data_dir,
            api: ApiHandle::new(Arc::clone(&versions)),
            versions,
        })
    }

    /// Install the host-specific native version discovery mechanism.
    ///
    /// The slot is write-once; returns false if a provider was already
    /// installed.
    pub fn install_version_provider(&self, provider: Arc<dyn NativeVersionProvider>) -> bool {
        self.versions.set(provider).is_ok()
    }

    /// Discovered native protocol version, if any.
    pub fn native_version(&self) -> Option<ProtocolVersion> {
        self.versions
            .get()
            .and_then(|provider| provider.native_protocol_version())
    }

    /// Host services this adapter was constructed with.
    pub fn host(&self) -> &HostServices {
        &self.host
    }

    /// Scheduler backing the platform's scheduling operations.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl ViaPlatform for PlatformAdapter {
    fn logger(&self) -> &PlatformLogger {
        &self.logger
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn api(&self) -> &ApiHandle {
        &self.api
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn platform_name(&self) -> &str {
        platform_constants::PLATFORM_NAME
    }

    fn platform_version(&self) -> String {
        self.host
            .registry
            .mod_version(platform_constants::BRIDGE_MOD_ID)
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }

    fn plugin_version(&self) -> String {
        self.host
            .registry
            .mod_version(platform_constants::ENGINE_MOD_ID)
            .unwrap_or_else(|| platform_constants::UNKNOWN_VERSION.to_string())
    }

    fn is_proxy(&self) -> bool {
        // A thin client has no authoritative native version of its own.
        self.host.environment == Environment::Client
    }

    fn dump(&self) -> DiagnosticDump {
        build_dump(self.host.registry.as_ref(), self.native_version())
    }

    fn has_extension(&self, id: &str) -> bool {
        self.host.registry.is_loaded(id)
    }

    fn run_async(&self, task: TaskFn) -> TaskHandle {
        self.scheduler.run_async(task)
    }

    fn run_repeating_async(&self, task: RepeatingTaskFn, interval_ticks: u64) -> TaskHandle {
        self.scheduler.run_repeating_async(task, interval_ticks)
    }

    fn run_delayed(&self, task: TaskFn, delay_ticks: u64) -> TaskHandle {
        self.scheduler.run_delayed_on_loop(task, delay_ticks)
    }

    fn run_repeating(&self, task: RepeatingTaskFn, interval_ticks: u64) -> TaskHandle {
        self.scheduler.run_repeating_on_loop(task, interval_ticks)
    }
}
