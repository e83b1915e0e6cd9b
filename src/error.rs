//! Error types and exit codes for census-locator
//!
//! Expected validation outcomes (bad syntax, not-found, out-of-range) are not
//! errors: they accumulate as [`crate::report::Issue`] values and travel with
//! the partial resolution result. This type covers the conditions that abort a
//! request outright.

use std::process::ExitCode;
use thiserror::Error;

/// Fatal error type for census-locator operations
#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Malformed parameter: {arg} (expected key=value)")]
    BadParameter { arg: String },

    #[error("Entity store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Fixture error: {message}")]
    Fixture { message: String },

    #[error("Usage error: {message}")]
    Usage { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LocatorError {
    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: IO error
    /// - 2: Bad invocation (malformed parameter, usage)
    /// - 3: Fixture load failure
    /// - 4: Entity store failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::BadParameter { .. } => ExitCode::from(2),
            Self::Usage { .. } => ExitCode::from(2),
            Self::Fixture { .. } => ExitCode::from(3),
            Self::Store(_) => ExitCode::from(4),
            Self::Io(_) => ExitCode::from(1),
        }
    }
}

/// Result type alias for census-locator operations
pub type Result<T> = std::result::Result<T, LocatorError>;
