//! Outcome to exit status translation

use crate::outcome::HealthOutcome;

/// Process exit status consumed by orchestrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Target is serving (exit 0)
    Healthy,
    /// Anything else, including configuration errors (exit 1)
    Unhealthy,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Healthy => 0,
            Self::Unhealthy => 1,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Healthy => std::process::ExitCode::SUCCESS,
            ExitStatus::Unhealthy => std::process::ExitCode::FAILURE,
        }
    }
}

/// Map an outcome to its exit status
///
/// Only `Serving` passes. Every arm is spelled out so a new outcome cannot
/// slip through as healthy.
pub fn translate(outcome: &HealthOutcome) -> ExitStatus {
    match outcome {
        HealthOutcome::Serving => ExitStatus::Healthy,
        HealthOutcome::NotServing
        | HealthOutcome::Unknown
        | HealthOutcome::ServiceNotFound { .. }
        | HealthOutcome::DeadlineExceeded { .. }
        | HealthOutcome::ConnectionFailed { .. }
        | HealthOutcome::ProtocolError => ExitStatus::Unhealthy,
    }
}
