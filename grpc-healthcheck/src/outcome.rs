//! Health outcome classification
//!
//! Maps whatever the single RPC produced onto a closed set of outcomes. The
//! mapping is exhaustive and fails closed: anything not positively recognised
//! becomes [`HealthOutcome::ProtocolError`], never [`HealthOutcome::Serving`].

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::Duration;

use tonic::{Code, Status};
use tonic_health::pb::health_check_response::ServingStatus;

use crate::client::{RawResult, TransportError};
use crate::query::HealthQuery;

/// Why a connection could not be used
///
/// All of these exit the same way; the distinction only shows up in
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectFailure {
    /// Nothing accepted the TCP connection
    Refused,
    /// The host name could not be resolved
    Resolution,
    /// TLS handshake or certificate verification failed
    Tls,
    /// The connection was dropped before any reply
    Reset,
    /// TCP connect or handshake did not finish in time
    TimedOut,
    /// Any other transport-level failure
    Other,
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "connection refused"),
            Self::Resolution => write!(f, "name resolution failed"),
            Self::Tls => write!(f, "TLS handshake failed"),
            Self::Reset => write!(f, "connection reset"),
            Self::TimedOut => write!(f, "connect timed out"),
            Self::Other => write!(f, "transport error"),
        }
    }
}

/// Result of a health query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Server reported `SERVING`
    Serving,
    /// Server reported `NOT_SERVING`
    NotServing,
    /// Server reported `UNKNOWN`
    Unknown,
    /// Server has no health status registered for the service
    ServiceNotFound {
        /// Service name that was queried
        service: String,
    },
    /// No reply arrived before the deadline
    DeadlineExceeded {
        /// Deadline that elapsed
        deadline: Duration,
    },
    /// The transport could not be established or was lost
    ConnectionFailed {
        /// Classified cause
        cause: ConnectFailure,
    },
    /// A reply arrived but was not a usable health response
    ProtocolError,
}

impl HealthOutcome {
    /// Whether the target is ready to serve
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Serving)
    }

    /// Stable upper-case name, suitable for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serving => "SERVING",
            Self::NotServing => "NOT_SERVING",
            Self::Unknown => "UNKNOWN",
            Self::ServiceNotFound { .. } => "SERVICE_NOT_FOUND",
            Self::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            Self::ConnectionFailed { .. } => "CONNECTION_FAILED",
            Self::ProtocolError => "PROTOCOL_ERROR",
        }
    }

    /// Deterministic one-line description of this outcome
    pub fn summary(&self) -> String {
        match self {
            Self::Serving => "status: SERVING".to_string(),
            Self::NotServing => "status: NOT_SERVING".to_string(),
            Self::Unknown => "status: UNKNOWN".to_string(),
            Self::ServiceNotFound { service } if service.is_empty() => {
                "overall server health not registered on server".to_string()
            }
            Self::ServiceNotFound { service } => {
                format!("service '{}' not found on server", service)
            }
            Self::DeadlineExceeded { deadline } => {
                format!("health check timed out after {}", format_duration(*deadline))
            }
            Self::ConnectionFailed { cause } => format!("cannot connect to server ({})", cause),
            Self::ProtocolError => "protocol error: unexpected reply from server".to_string(),
        }
    }
}

impl fmt::Display for HealthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Human-readable description of an outcome
///
/// `summary` is fixed per outcome; `detail` holds raw error text and is only
/// shown in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Deterministic summary line
    pub summary: String,
    /// Raw underlying detail, if any
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(outcome: &HealthOutcome, detail: Option<String>) -> Self {
        Self {
            summary: outcome.summary(),
            detail,
        }
    }

    /// Render for output; verbose appends the raw detail
    pub fn render(&self, verbose: bool) -> String {
        match (&self.detail, verbose) {
            (Some(detail), true) => format!("{}\n   Details: {}", self.summary, detail),
            _ => self.summary.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Classify a raw RPC result
pub fn interpret(raw: RawResult, query: &HealthQuery) -> (HealthOutcome, Diagnostic) {
    let (outcome, detail) = match raw {
        RawResult::Reply(reply) => interpret_reply(reply.status, query),
        RawResult::Elapsed(deadline) => (
            HealthOutcome::DeadlineExceeded { deadline },
            Some("no reply received before the deadline".to_string()),
        ),
        RawResult::Status(status) => interpret_status(&status, query),
    };

    let diagnostic = Diagnostic::new(&outcome, detail);
    (outcome, diagnostic)
}

/// Classify a failure to even build the channel
pub fn interpret_transport_error(err: &TransportError) -> (HealthOutcome, Diagnostic) {
    let cause = match err {
        TransportError::Tls(_) => ConnectFailure::Tls,
        TransportError::InvalidUri { .. } => ConnectFailure::Other,
    };
    let outcome = HealthOutcome::ConnectionFailed { cause };
    let diagnostic = Diagnostic::new(&outcome, Some(error_chain(err)));
    (outcome, diagnostic)
}

fn interpret_reply(status: i32, query: &HealthQuery) -> (HealthOutcome, Option<String>) {
    match ServingStatus::try_from(status) {
        Ok(ServingStatus::Serving) => (HealthOutcome::Serving, None),
        Ok(ServingStatus::NotServing) => (HealthOutcome::NotServing, None),
        Ok(ServingStatus::Unknown) => (HealthOutcome::Unknown, None),
        // Only meaningful for Watch, but a server may still send it from Check
        Ok(ServingStatus::ServiceUnknown) => (
            HealthOutcome::ServiceNotFound {
                service: query.service().to_string(),
            },
            Some("server replied SERVICE_UNKNOWN".to_string()),
        ),
        Err(_) => (
            HealthOutcome::ProtocolError,
            Some(format!("unrecognized serving status value {}", status)),
        ),
    }
}

fn interpret_status(status: &Status, query: &HealthQuery) -> (HealthOutcome, Option<String>) {
    let detail = Some(status_detail(status));

    if status.code() == Code::NotFound {
        let outcome = HealthOutcome::ServiceNotFound {
            service: query.service().to_string(),
        };
        return (outcome, detail);
    }

    if is_deadline(status) {
        let outcome = HealthOutcome::DeadlineExceeded {
            deadline: query.deadline(),
        };
        return (outcome, detail);
    }

    if let Some(cause) = connect_failure(status) {
        return (HealthOutcome::ConnectionFailed { cause }, detail);
    }

    let detail = match status.code() {
        Code::Unimplemented => Some(format!(
            "{}; the server must implement grpc.health.v1.Health",
            status_detail(status)
        )),
        _ => detail,
    };
    (HealthOutcome::ProtocolError, detail)
}

fn is_deadline(status: &Status) -> bool {
    match status.code() {
        Code::DeadlineExceeded => true,
        // tonic's client-side timeout layer reports as Cancelled
        Code::Cancelled => status.message().contains("Timeout expired"),
        _ => false,
    }
}

/// Find a connection-class cause in the status or its source chain
///
/// Only a locally attached `io::Error` or an `Unavailable` code counts. A
/// status carrying any other code is a reply and stays a protocol error.
fn connect_failure(status: &Status) -> Option<ConnectFailure> {
    let mut source: Option<&(dyn StdError + 'static)> = status.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if let Some(cause) = classify_io(io_err) {
                return Some(cause);
            }
        }
        source = err.source();
    }

    // Message text from any other code may have been written by the server
    if status.code() != Code::Unavailable {
        return None;
    }

    let text = status_detail(status).to_lowercase();
    Some(classify_text(&text).unwrap_or(ConnectFailure::Other))
}

fn classify_io(err: &io::Error) -> Option<ConnectFailure> {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => Some(ConnectFailure::Refused),
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::NotConnected => Some(ConnectFailure::Reset),
        io::ErrorKind::TimedOut => Some(ConnectFailure::TimedOut),
        io::ErrorKind::AddrNotAvailable => Some(ConnectFailure::Other),
        _ => classify_text(&err.to_string().to_lowercase()),
    }
}

fn classify_text(text: &str) -> Option<ConnectFailure> {
    const TLS: &[&str] = &["certificate", "handshake", "tls", "invalidpeer", "unknownissuer"];
    const RESOLUTION: &[&str] = &[
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname",
        "no such host",
    ];

    if text.contains("connection refused") {
        Some(ConnectFailure::Refused)
    } else if RESOLUTION.iter().any(|needle| text.contains(needle)) {
        Some(ConnectFailure::Resolution)
    } else if TLS.iter().any(|needle| text.contains(needle)) {
        Some(ConnectFailure::Tls)
    } else if text.contains("connection reset") || text.contains("broken pipe") {
        Some(ConnectFailure::Reset)
    } else if text.contains("timed out") {
        Some(ConnectFailure::TimedOut)
    } else {
        None
    }
}

/// `code: message` followed by the source chain
fn status_detail(status: &Status) -> String {
    let mut detail = format!("gRPC {:?}: {}", status.code(), status.message());
    let mut source = status.source();
    while let Some(err) = source {
        detail.push_str(": ");
        detail.push_str(&err.to_string());
        source = err.source();
    }
    detail
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic_health::pb::HealthCheckResponse;

    fn query(service: &str) -> HealthQuery {
        HealthQuery::new(service, Duration::from_secs(5)).unwrap()
    }

    fn reply(status: i32) -> RawResult {
        RawResult::Reply(HealthCheckResponse { status })
    }

    #[test]
    fn test_reply_statuses() {
        let q = query("");
        let (outcome, diag) = interpret(reply(ServingStatus::Serving as i32), &q);
        assert_eq!(outcome, HealthOutcome::Serving);
        assert!(diag.summary.contains("SERVING"));
        assert!(diag.detail.is_none());

        let (outcome, diag) = interpret(reply(ServingStatus::NotServing as i32), &q);
        assert_eq!(outcome, HealthOutcome::NotServing);
        assert_eq!(diag.summary, "status: NOT_SERVING");

        let (outcome, diag) = interpret(reply(ServingStatus::Unknown as i32), &q);
        assert_eq!(outcome, HealthOutcome::Unknown);
        assert_eq!(diag.summary, "status: UNKNOWN");
    }

    #[test]
    fn test_service_unknown_reply_is_not_found() {
        let q = query("myapp.UserService");
        let (outcome, _) = interpret(reply(ServingStatus::ServiceUnknown as i32), &q);
        assert_eq!(
            outcome,
            HealthOutcome::ServiceNotFound {
                service: "myapp.UserService".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_status_fails_closed() {
        let (outcome, diag) = interpret(reply(42), &query(""));
        assert_eq!(outcome, HealthOutcome::ProtocolError);
        assert!(diag.detail.unwrap().contains("42"));
    }

    #[test]
    fn test_not_found_is_distinct_from_not_serving() {
        let q = query("myapp.UserService");
        let status = Status::not_found("service not registered");
        let (outcome, diag) = interpret(RawResult::Status(status), &q);
        assert_eq!(outcome.name(), "SERVICE_NOT_FOUND");
        assert_eq!(diag.summary, "service 'myapp.UserService' not found on server");
        assert_ne!(diag.summary, HealthOutcome::NotServing.summary());
    }

    #[test]
    fn test_elapsed_is_deadline_exceeded() {
        let q = query("");
        let (outcome, diag) = interpret(RawResult::Elapsed(Duration::from_millis(1500)), &q);
        assert_eq!(
            outcome,
            HealthOutcome::DeadlineExceeded {
                deadline: Duration::from_millis(1500)
            }
        );
        assert_eq!(diag.summary, "health check timed out after 1.5s");
    }

    #[test]
    fn test_deadline_status_codes() {
        let q = query("");
        let (outcome, diag) = interpret(RawResult::Status(Status::deadline_exceeded("late")), &q);
        assert!(matches!(outcome, HealthOutcome::DeadlineExceeded { .. }));
        assert_eq!(diag.summary, "health check timed out after 5s");

        let (outcome, _) = interpret(RawResult::Status(Status::cancelled("Timeout expired")), &q);
        assert!(matches!(outcome, HealthOutcome::DeadlineExceeded { .. }));

        let (outcome, _) = interpret(RawResult::Status(Status::cancelled("client went away")), &q);
        assert_eq!(outcome, HealthOutcome::ProtocolError);
    }

    #[test]
    fn test_unavailable_is_connection_failed() {
        let status = Status::unavailable("tcp connect error: Connection refused (os error 111)");
        let (outcome, diag) = interpret(RawResult::Status(status), &query(""));
        assert_eq!(
            outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::Refused
            }
        );
        assert_eq!(diag.summary, "cannot connect to server (connection refused)");
    }

    #[test]
    fn test_unavailable_without_known_cause() {
        let (outcome, _) = interpret(RawResult::Status(Status::unavailable("draining")), &query(""));
        assert_eq!(
            outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::Other
            }
        );
    }

    #[test]
    fn test_io_source_chain_is_classified() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused");
        let status = Status::from_error(Box::new(io_err));
        let (outcome, _) = interpret(RawResult::Status(status), &query(""));
        assert_eq!(
            outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::Refused
            }
        );
    }

    #[test]
    fn test_tls_and_refused_stay_distinct() {
        let tls = Status::unavailable("invalid peer certificate: UnknownIssuer");
        let refused = Status::unavailable("Connection refused");
        let (tls_outcome, tls_diag) = interpret(RawResult::Status(tls), &query(""));
        let (refused_outcome, refused_diag) = interpret(RawResult::Status(refused), &query(""));

        assert_eq!(
            tls_outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::Tls
            }
        );
        assert_ne!(tls_outcome, refused_outcome);
        assert_ne!(tls_diag.summary, refused_diag.summary);
    }

    #[test]
    fn test_resolution_failure() {
        let status = Status::unavailable("dns error: failed to lookup address information");
        let (outcome, _) = interpret(RawResult::Status(status), &query(""));
        assert_eq!(
            outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::Resolution
            }
        );
    }

    #[test]
    fn test_connect_timeout_is_connection_failed() {
        let status = Status::unavailable("error trying to connect: request timed out");
        let (outcome, _) = interpret(RawResult::Status(status), &query(""));
        assert_eq!(
            outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::TimedOut
            }
        );
    }

    #[test]
    fn test_server_sent_text_does_not_look_like_a_connect_failure() {
        for status in [
            Status::internal("upstream database query timed out"),
            Status::permission_denied("caller certificate not allowed"),
            Status::failed_precondition("backend connection refused by policy"),
            Status::unknown("tls handshake with downstream failed"),
        ] {
            let (outcome, diag) = interpret(RawResult::Status(status), &query(""));
            assert_eq!(outcome, HealthOutcome::ProtocolError);
            assert!(!diag.summary.contains("cannot connect"));
        }
    }

    #[test]
    fn test_local_io_error_counts_under_any_code() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let status = Status::from_error(Box::new(io_err));
        let (outcome, _) = interpret(RawResult::Status(status), &query(""));
        assert!(matches!(outcome, HealthOutcome::ConnectionFailed { .. }));
    }

    #[test]
    fn test_unimplemented_is_protocol_error() {
        let status = Status::unimplemented("");
        let (outcome, diag) = interpret(RawResult::Status(status), &query(""));
        assert_eq!(outcome, HealthOutcome::ProtocolError);
        assert!(diag.detail.unwrap().contains("grpc.health.v1.Health"));
    }

    #[test]
    fn test_other_codes_fail_closed() {
        for status in [
            Status::internal("h2 protocol error"),
            Status::unknown("garbage"),
            Status::permission_denied("nope"),
            Status::invalid_argument("bad"),
        ] {
            let (outcome, _) = interpret(RawResult::Status(status), &query(""));
            assert_eq!(outcome, HealthOutcome::ProtocolError);
        }
    }

    #[test]
    fn test_transport_error_is_connection_failed() {
        let err = TransportError::InvalidUri {
            uri: "http://:1".to_string(),
            reason: "empty host".to_string(),
        };
        let (outcome, diag) = interpret_transport_error(&err);
        assert_eq!(
            outcome,
            HealthOutcome::ConnectionFailed {
                cause: ConnectFailure::Other
            }
        );
        assert!(diag.detail.unwrap().contains("empty host"));
    }

    #[test]
    fn test_render_verbose_only_adds_detail() {
        let status = Status::not_found("unknown service");
        let (_, diag) = interpret(RawResult::Status(status), &query("svc"));
        let quiet = diag.render(false);
        let verbose = diag.render(true);
        assert_eq!(quiet, "service 'svc' not found on server");
        assert!(verbose.starts_with(&quiet));
        assert!(verbose.contains("unknown service"));
    }

    #[test]
    fn test_empty_service_not_found_summary() {
        let (_, diag) = interpret(RawResult::Status(Status::not_found("")), &query(""));
        assert_eq!(diag.summary, "overall server health not registered on server");
    }

    #[test]
    fn test_interpretation_is_repeatable() {
        let q = query("svc");
        let first = interpret(reply(ServingStatus::NotServing as i32), &q);
        let second = interpret(reply(ServingStatus::NotServing as i32), &q);
        assert_eq!(first, second);
    }
}
