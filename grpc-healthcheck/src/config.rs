//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Command-line flags (applied by the caller on top of the loaded config)
//! 2. Environment variables (prefix: GRPC_HEALTHCHECK_, `__` separates sections)
//! 3. Current working directory: ./grpc-healthcheck.toml
//! 4. XDG config directory: ~/.config/grpc-healthcheck/config.toml
//! 5. System directory: /etc/grpc-healthcheck/config.toml
//! 6. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::query::DEFAULT_TIMEOUT;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "GRPC_HEALTHCHECK_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Health check defaults
    #[serde(default)]
    pub check: CheckConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Files that were merged, highest priority first
    #[serde(skip)]
    pub sources: Vec<PathBuf>,
}

/// Defaults for the health check itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Target in `host:port` form
    #[serde(default)]
    pub target: Option<String>,

    /// Target host, used with `port` when `target` is not set
    #[serde(default)]
    pub host: Option<String>,

    /// Target port, used with `host`
    #[serde(default)]
    pub port: Option<u32>,

    /// Service name to probe (empty for overall server health)
    #[serde(default)]
    pub service: String,

    /// Deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Use TLS with the system trust roots
    #[serde(default)]
    pub tls: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line records
    #[default]
    Compact,
    /// One JSON object per record
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (trace, debug, info, warn, error or EnvFilter directives)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            target: None,
            host: None,
            port: None,
            service: String::new(),
            timeout_secs: default_timeout_secs(),
            tls: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT.as_secs_f64()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Every existing file among the search paths is merged, lower priority
    /// first. Environment variables override all file-based configs.
    pub fn load() -> Result<Self> {
        let existing: Vec<PathBuf> = Self::find_config_paths()
            .into_iter()
            .filter(|p| p.exists())
            .collect();
        Self::extract(existing)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the search paths. Unlike them, the file must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", path.display()),
            )));
        }

        Self::extract(vec![path.to_path_buf()])
    }

    fn extract(files: Vec<PathBuf>) -> Result<Self> {
        let mut config: Self = Self::figment(&files, ENV_PREFIX).extract()?;
        config.sources = files;
        Ok(config)
    }

    /// Build the provider stack
    ///
    /// `files` are given highest priority first.
    fn figment(files: &[PathBuf], env_prefix: &str) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        for path in files.iter().rev() {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(env_prefix).split("__"))
    }

    /// Find all possible config file paths
    ///
    /// Returns paths in priority order (highest first):
    /// 1. Current working directory
    /// 2. XDG config directory
    /// 3. System directory
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("grpc-healthcheck.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("grpc-healthcheck");
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc/grpc-healthcheck/config.toml"));

        paths
    }
}
