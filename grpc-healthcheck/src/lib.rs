//! # grpc-healthcheck
//!
//! One-shot client for the [gRPC Health Checking Protocol] that turns a
//! server's answer into a process exit status, for use as a readiness or
//! liveness probe by orchestrators, container runtimes and CI pipelines.
//!
//! ## Flow
//!
//! 1. [`CheckOptions::into_parts`] validates caller input into a [`Target`] and a
//!    [`HealthQuery`]. Bad input is a configuration [`Error`] and never reaches
//!    the network.
//! 2. [`client::build`] creates a lazily-connected channel (plaintext or TLS).
//! 3. [`client::invoke`] sends exactly one `Health/Check` bounded by the deadline.
//! 4. [`outcome::interpret`] classifies the result into a [`HealthOutcome`].
//! 5. [`exit::translate`] maps `Serving` to exit 0 and everything else to 1.
//!
//! ## Example
//!
//! ```rust,no_run
//! use grpc_healthcheck::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let target = Target::parse("localhost:50051", SecurityMode::Plaintext).unwrap();
//!     let query = HealthQuery::overall();
//!
//!     let report = run_check(target, query).await;
//!     println!("{}", report.diagnostic);
//!     report.exit_status().into()
//! }
//! ```
//!
//! [gRPC Health Checking Protocol]: https://github.com/grpc/grpc/blob/master/doc/health-checking.md

pub mod check;
pub mod client;
pub mod config;
pub mod error;
pub mod exit;
pub mod observability;
pub mod outcome;
pub mod query;
pub mod target;

pub use check::{check, run_check, CheckOptions, CheckReport};
pub use error::{Error, Result};
pub use exit::ExitStatus;
pub use outcome::{ConnectFailure, Diagnostic, HealthOutcome};
pub use query::HealthQuery;
pub use target::{SecurityMode, Target};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::check::{check, run_check, CheckOptions, CheckReport};
    pub use crate::config::{Config, LogFormat, LoggingConfig};
    pub use crate::error::{Error, Result};
    pub use crate::exit::{translate, ExitStatus};
    pub use crate::observability::init_tracing;
    pub use crate::outcome::{ConnectFailure, Diagnostic, HealthOutcome};
    pub use crate::query::{HealthQuery, DEFAULT_TIMEOUT};
    pub use crate::target::{SecurityMode, Target};
}
