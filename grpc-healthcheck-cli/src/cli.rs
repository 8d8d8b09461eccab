use clap::{ArgGroup, Parser};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  # Check overall server health
  grpc-healthcheck --target localhost:50051

  # Check specific service
  grpc-healthcheck --target localhost:50051 --service myapp.UserService

  # Using separate host and port
  grpc-healthcheck --host localhost --port 50051

  # With TLS and custom timeout
  grpc-healthcheck --target example.com:443 --tls --timeout 10

  # Verbose output
  grpc-healthcheck --target localhost:50051 -v

Exit status is 0 when the service is SERVING and 1 otherwise.";

/// gRPC Health Check Tool - Check the health of gRPC services
#[derive(Debug, Parser)]
#[command(name = "grpc-healthcheck")]
#[command(version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
#[command(group(ArgGroup::new("address").args(["target", "host"]).multiple(false)))]
pub struct Cli {
    /// gRPC server target address (e.g. 'localhost:50051')
    #[arg(long, value_name = "HOST:PORT")]
    pub target: Option<String>,

    /// gRPC server host (use with --port)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// gRPC server port (use with --host)
    #[arg(long, value_name = "PORT", conflicts_with = "target")]
    pub port: Option<u32>,

    /// Service name to check (empty for overall server health)
    #[arg(long, value_name = "NAME")]
    pub service: Option<String>,

    /// Timeout in seconds [default: 5.0]
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Use TLS/SSL for the connection
    #[arg(long)]
    pub tls: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read settings from this config file instead of the default locations
    #[arg(long, value_name = "PATH", env = "GRPC_HEALTHCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter for diagnostics on stderr (e.g. debug, grpc_healthcheck=trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}
