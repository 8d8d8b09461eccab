//! Merge configuration files, environment and flags

use anyhow::{Context, Result};
use grpc_healthcheck::config::{Config, LoggingConfig};
use grpc_healthcheck::CheckOptions;
use std::path::Path;

use crate::cli::Cli;

/// Load the layered configuration, or a single explicit file
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Config::load().context("Failed to load configuration"),
    }
}

/// Apply command-line flags on top of the configured check settings
pub fn check_options(cli: &Cli, config: &Config) -> CheckOptions {
    let mut options = CheckOptions::from(&config.check);

    if let Some(target) = &cli.target {
        options.target = Some(target.clone());
    }
    if let Some(host) = &cli.host {
        // An explicit host replaces any configured target
        options.target = None;
        options.host = Some(host.clone());
    }
    if let Some(port) = cli.port {
        options.port = Some(port);
    }
    if let Some(service) = &cli.service {
        options.service = service.clone();
    }
    if let Some(timeout) = cli.timeout {
        options.timeout_secs = timeout;
    }
    options.tls |= cli.tls;

    options
}

/// Logging settings after `--log-level` and `--verbose`
pub fn logging_config(cli: &Cli, config: &Config) -> LoggingConfig {
    let mut logging = config.logging.clone();

    match (&cli.log_level, cli.verbose) {
        (Some(level), _) => logging.level = level.clone(),
        (None, true) => logging.level = format!("{},grpc_healthcheck=debug", logging.level),
        (None, false) => {}
    }

    logging
}
