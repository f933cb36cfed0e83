//! Error types for PocketDrop
//!
//! Errors fall into two groups. Everything in [`LaunchError`] is returned
//! synchronously from a launch call, before a request handle exists and
//! before any handler fires. [`TransferError`] only ever reaches the caller
//! through the completion handler.

use thiserror::Error;

/// Input rejected before any work is started
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source path is not set")]
    EmptyPath,

    #[error("shared secret is not set")]
    EmptySecret,
}

/// The engine refused the translated configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine configuration rejected: {0}")]
pub struct ConfigurationError(pub String);

/// The engine could not enumerate the files to send
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("file enumeration failed: {0}")]
pub struct EnumerationError(pub String);

impl From<std::io::Error> for EnumerationError {
    fn from(e: std::io::Error) -> Self {
        EnumerationError(e.to_string())
    }
}

/// Synchronous failure of a send or receive call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Enumeration(#[from] EnumerationError),
}

/// Terminal failure of a running transfer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Failure reported by the engine (including its view of cancellation)
    #[error("transfer failed: {0}")]
    Engine(String),

    /// Engine stopped because the request was cancelled
    #[error("transfer cancelled")]
    Cancelled,

    /// The worker running the engine died before returning
    #[error("transfer aborted: {0}")]
    Aborted(String),
}
