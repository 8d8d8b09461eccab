//! One complete health check: build, invoke, interpret
//!
//! [`run_check`] never fails. Configuration problems are caught earlier by
//! [`CheckOptions::into_parts`]; everything that can go wrong on the network
//! ends up in the report's [`HealthOutcome`].

use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::client::{invoker, transport};
use crate::config::CheckConfig;
use crate::error::{Error, Result};
use crate::exit::{self, ExitStatus};
use crate::outcome::{self, Diagnostic, HealthOutcome};
use crate::query::{HealthQuery, DEFAULT_TIMEOUT};
use crate::target::{SecurityMode, Target};

/// Unvalidated invocation settings, merged from configuration and flags
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    /// Target in `host:port` form; takes precedence over `host`/`port`
    pub target: Option<String>,
    /// Target host
    pub host: Option<String>,
    /// Target port, required with `host`
    pub port: Option<u32>,
    /// Service name (empty for overall server health)
    pub service: String,
    /// Deadline in seconds
    pub timeout_secs: f64,
    /// Use TLS
    pub tls: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            target: None,
            host: None,
            port: None,
            service: String::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            tls: false,
        }
    }
}

impl From<&CheckConfig> for CheckOptions {
    fn from(config: &CheckConfig) -> Self {
        Self {
            target: config.target.clone(),
            host: config.host.clone(),
            port: config.port,
            service: config.service.clone(),
            timeout_secs: config.timeout_secs,
            tls: config.tls,
        }
    }
}

impl CheckOptions {
    /// Validate into a target and query
    ///
    /// Fails with a configuration error before any network activity.
    pub fn into_parts(self) -> Result<(Target, HealthQuery)> {
        let security = SecurityMode::from_tls_flag(self.tls);

        let target = match (self.target, self.host, self.port) {
            (Some(target), _, _) => Target::parse(&target, security)?,
            (None, Some(host), Some(port)) => Target::from_host_port(&host, port, security)?,
            (None, Some(host), None) => {
                return Err(Error::invalid_target(
                    host,
                    "--port is required when using --host",
                ))
            }
            (None, None, _) => return Err(Error::MissingTarget),
        };

        let query = HealthQuery::from_secs_f64(self.service, self.timeout_secs)?;
        Ok((target, query))
    }
}

/// Everything known about a finished health check
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Endpoint that was probed
    pub target: Target,
    /// Query that was sent
    pub query: HealthQuery,
    /// Classified result
    pub outcome: HealthOutcome,
    /// Human-readable description of the result
    pub diagnostic: Diagnostic,
    /// Wall-clock time from channel construction to classification
    pub elapsed: Duration,
}

impl CheckReport {
    /// Exit status for this report
    pub fn exit_status(&self) -> ExitStatus {
        exit::translate(&self.outcome)
    }
}

/// Run a single health check against `target`
///
/// The channel only lives for the duration of the call and is closed on every
/// path, including deadline expiry and connection failure.
pub async fn run_check(target: Target, query: HealthQuery) -> CheckReport {
    let span = tracing::info_span!(
        "health_check",
        endpoint = %target,
        service = query.service(),
        security = %target.security(),
    );

    async move {
        let started = Instant::now();

        let (outcome, diagnostic) = match transport::build(&target, query.deadline()) {
            Ok(channel) => {
                let raw = invoker::invoke(channel, &query).await;
                outcome::interpret(raw, &query)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Failed to build channel");
                outcome::interpret_transport_error(&err)
            }
        };

        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        if outcome.is_serving() {
            tracing::info!(outcome = outcome.name(), elapsed_ms, "Health check passed");
        } else {
            tracing::warn!(
                outcome = outcome.name(),
                elapsed_ms,
                detail = diagnostic.detail.as_deref().unwrap_or(""),
                "Health check failed"
            );
        }

        CheckReport {
            target,
            query,
            outcome,
            diagnostic,
            elapsed,
        }
    }
    .instrument(span)
    .await
}

/// Validate `options` and run the check
pub async fn check(options: CheckOptions) -> Result<CheckReport> {
    let (target, query) = options.into_parts()?;
    Ok(run_check(target, query).await)
}
