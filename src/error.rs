//! Error types for Wreckingball operations.
//!
//! This module defines [`WreckingballError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Validation errors (`HostNotFound`, `UnknownKind`, `NotRemediable`) are
//!   raised synchronously before anything is handed to a task runner
//! - `DuplicateKind` only occurs while building the check registry at startup
//! - `SnapshotUnavailable` is per host and never aborts a fleet refresh
//! - Use `anyhow::Error` (via `WreckingballError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Wreckingball operations.
#[derive(Debug, Error)]
pub enum WreckingballError {
    /// Requested check kind is not registered.
    #[error("Unknown status check: {kind}")]
    UnknownKind { kind: String },

    /// A check kind was registered twice.
    #[error("Status check '{kind}' is already registered")]
    DuplicateKind { kind: String },

    /// Host is not known to the inventory.
    #[error("Host not found: {host}")]
    HostNotFound { host: String },

    /// Remediation was requested for a status that cannot be remediated.
    #[error("Status '{kind}' of host '{host}' can not be remediated: {reason}")]
    NotRemediable {
        host: String,
        kind: String,
        reason: String,
    },

    /// Provider data for a host could not be read.
    #[error("Snapshot unavailable for host '{host}': {message}")]
    SnapshotUnavailable { host: String, message: String },

    /// The task runner refused a task.
    #[error("Failed to submit task: {message}")]
    TaskSubmission { message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration or data file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WreckingballError {
    /// Whether the error means the requested thing does not exist.
    ///
    /// Front ends map these to "not found" responses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WreckingballError::UnknownKind { .. } | WreckingballError::HostNotFound { .. }
        )
    }
}

/// Result type alias for Wreckingball operations.
pub type Result<T> = std::result::Result<T, WreckingballError>;
