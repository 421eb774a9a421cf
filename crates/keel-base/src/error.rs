//! Unified error types for Keel.

use thiserror::Error;

/// The main error type for Keel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad command-line usage.
    #[error("{0}")]
    Usage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DIMACS input is malformed.
    #[error("parse error: {0}")]
    Parse(String),

    /// An optimization was requested that the oracle does not support.
    #[error("oracle capability missing: {0}")]
    Capability(String),

    /// Allocation failure for one of the per-variable stores.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A driver-state assertion failed or the checker disagreed.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    /// Returns whether this error must abort with a statistics dump
    /// instead of mapping to the usage exit code.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_) | Self::ResourceExhausted(_))
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
