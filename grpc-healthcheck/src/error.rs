//! Error types
//!
//! Every variant here is a configuration-class failure: it is raised before any
//! network activity and is never retried. Network and protocol failures are not
//! errors at all; they are folded into a [`HealthOutcome`](crate::outcome::HealthOutcome).

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the health check client
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or extracted
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Target address is malformed or out of range
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget {
        /// The target as supplied by the caller
        target: String,
        /// Why it was rejected
        reason: String,
    },

    /// Deadline is zero or cannot be represented
    #[error("Invalid timeout: {0}")]
    InvalidDeadline(String),

    /// Neither a `host:port` target nor a host was supplied
    #[error("No target given: use --target HOST:PORT or --host HOST --port PORT")]
    MissingTarget,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an [`Error::InvalidTarget`]
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Build an [`Error::InvalidDeadline`] from a duration that failed validation
    pub fn invalid_deadline(deadline: Duration) -> Self {
        Error::InvalidDeadline(format!("{:?} (must be greater than zero)", deadline))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
