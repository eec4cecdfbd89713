//! Unified error types for the unshare workspace.
//!
//! Nothing in the hook path is fatal to the host: these errors surface
//! from host primitives and configuration loading, and callers decide
//! whether to log and continue.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum UnshareError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The host offers no way to rename the process.
    #[error("process rename is not available on this host")]
    RenameUnavailable,

    /// The host rename primitive reported a failure.
    #[error("failed to rename process to {name:?}: {message}")]
    RenameFailed {
        /// Display name that was being applied.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// The host primitive kept only a prefix of the requested name.
    #[error("process name {name:?} truncated to {applied:?}")]
    RenameTruncated {
        /// Display name that was requested.
        name: String,
        /// Prefix the process now carries.
        applied: String,
    },

    /// A display name cannot be passed to the OS (e.g. interior NUL).
    #[error("invalid display name {name:?}")]
    InvalidDisplayName {
        /// The rejected display name.
        name: String,
    },

    /// The host violated the load protocol.
    #[error("host protocol error: {message}")]
    Protocol {
        /// Description of the violation.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, UnshareError>;
