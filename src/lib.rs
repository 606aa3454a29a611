//! The `via_bridge` platform adapter library.
//!
//! This crate bridges a mod-loader host and an embedded protocol-translation
//! engine: it exposes the host's event loop, background executor, logger,
//! config directory, and extension metadata as the fixed platform contract
//! the engine consumes. It is glue, not an engine; packet translation and
//! per-connection state belong to the library plugged into it.

pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod logging;
pub mod platform;
pub mod sched;
