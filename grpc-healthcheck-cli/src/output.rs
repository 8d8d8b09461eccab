//! Terminal output for a health check
//!
//! Nothing printed here is a machine contract; the exit status is.

use colored::Colorize;
use grpc_healthcheck::{CheckReport, HealthOutcome, HealthQuery, Target};

/// Where a block of output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Lines to print and their destination
#[derive(Debug)]
pub struct Rendered {
    pub stream: Stream,
    pub lines: Vec<String>,
}

impl Rendered {
    pub fn print(&self) {
        for line in &self.lines {
            match self.stream {
                Stream::Stdout => println!("{}", line),
                Stream::Stderr => eprintln!("{}", line),
            }
        }
    }
}

/// Summary of what is about to be checked (verbose mode)
pub fn render_preflight(target: &Target, query: &HealthQuery) -> Rendered {
    let service = if query.is_overall() {
        "<overall server health>".to_string()
    } else {
        query.service().to_string()
    };
    let tls = if target.security().is_tls() {
        "enabled"
    } else {
        "disabled"
    };

    Rendered {
        stream: Stream::Stdout,
        lines: vec![
            format!("🔍 Checking health of gRPC server at {}", target.to_string().bold()),
            format!("   Service: {}", service),
            format!("   Timeout: {}s", query.deadline().as_secs_f64()),
            format!("   TLS: {}", tls),
            String::new(),
        ],
    }
}

/// Final verdict
///
/// Replies from the server go to stdout; failures to get a usable reply go to
/// stderr, as do their raw details in verbose mode.
pub fn render_report(report: &CheckReport, verbose: bool) -> Rendered {
    let summary = &report.diagnostic.summary;

    let (stream, mut lines) = match &report.outcome {
        HealthOutcome::Serving => (
            Stream::Stdout,
            vec![format!("{} ({})", "✅ Service is healthy".green().bold(), summary)],
        ),
        HealthOutcome::NotServing | HealthOutcome::Unknown => (
            Stream::Stdout,
            vec![format!("{} ({})", "❌ Service is not healthy".red().bold(), summary)],
        ),
        HealthOutcome::ServiceNotFound { .. }
        | HealthOutcome::DeadlineExceeded { .. }
        | HealthOutcome::ConnectionFailed { .. }
        | HealthOutcome::ProtocolError => (
            Stream::Stderr,
            vec![format!("{} {}", "❌ Health check failed:".red().bold(), summary)],
        ),
    };

    if verbose {
        if let Some(detail) = &report.diagnostic.detail {
            lines.push(format!("   Details: {}", detail));
        }
        lines.push(format!(
            "   Outcome: {} in {}ms",
            report.outcome.name(),
            report.elapsed.as_millis()
        ));
    }

    Rendered { stream, lines }
}
