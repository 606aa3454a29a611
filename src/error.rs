//! Custom error types for the via-bridge adapter.
//!
//! This module provides a centralized error handling system using the `thiserror` crate
//! to define structured, typed errors with clear messages and proper error conversion.

use std::io;
use thiserror::Error;

/// Primary error type for the adapter, covering all possible error cases.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Fatal errors during adapter initialization (e.g. missing config directory).
    #[error("Initialization error: {0}")]
    Init(String),

    /// Errors from invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors from the scheduling layer (e.g. submitting to a stopped event loop).
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Errors from the underlying IO system.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience type alias for Results with PlatformError.
pub type Result<T> = std::result::Result<T, PlatformError>;
