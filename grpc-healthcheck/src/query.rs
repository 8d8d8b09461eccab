//! Outbound health query

use std::time::Duration;

use crate::error::{Error, Result};

/// Default deadline for a health check
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A single `Health/Check` request and the deadline it must complete within
///
/// The service name is sent exactly as given. An empty name asks for the
/// overall server health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthQuery {
    service: String,
    deadline: Duration,
}

impl HealthQuery {
    /// Create a query, rejecting a zero deadline
    pub fn new(service: impl Into<String>, deadline: Duration) -> Result<Self> {
        if deadline.is_zero() {
            return Err(Error::invalid_deadline(deadline));
        }
        Ok(Self {
            service: service.into(),
            deadline,
        })
    }

    /// Create a query from a timeout in fractional seconds
    pub fn from_secs_f64(service: impl Into<String>, timeout_secs: f64) -> Result<Self> {
        let deadline = Duration::try_from_secs_f64(timeout_secs).map_err(|_| {
            Error::InvalidDeadline(format!(
                "{} (must be a finite number of seconds greater than zero)",
                timeout_secs
            ))
        })?;
        Self::new(service, deadline)
    }

    /// Query for the overall server health with the default deadline
    pub fn overall() -> Self {
        Self {
            service: String::new(),
            deadline: DEFAULT_TIMEOUT,
        }
    }

    /// Service name to probe
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Whether this asks for overall server health
    pub fn is_overall(&self) -> bool {
        self.service.is_empty()
    }

    /// Maximum time to wait for a reply
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}
