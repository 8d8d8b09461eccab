//! Health check target addressing
//!
//! A [`Target`] is validated once, up front, so that a malformed address is
//! reported as a configuration error and never reaches the transport.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use http::uri::Authority;

use crate::error::{Error, Result};

/// Transport security used to reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecurityMode {
    /// Unencrypted HTTP/2
    #[default]
    Plaintext,
    /// TLS using the platform's trusted certificate authorities
    Tls,
}

impl SecurityMode {
    /// Select the mode from a `--tls` style flag
    pub fn from_tls_flag(tls: bool) -> Self {
        if tls {
            Self::Tls
        } else {
            Self::Plaintext
        }
    }

    /// URI scheme used when building the endpoint
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Plaintext => "http",
            Self::Tls => "https",
        }
    }

    /// Whether TLS is negotiated
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls)
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plaintext => write!(f, "plaintext"),
            Self::Tls => write!(f, "tls"),
        }
    }
}

/// A resolved network endpoint to probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    host: String,
    port: u16,
    security: SecurityMode,
}

impl Target {
    /// Create a target from a host and port
    ///
    /// The host must be non-empty and the port in `1..=65535`.
    pub fn new(host: impl Into<String>, port: u16, security: SecurityMode) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::invalid_target(
                format!(":{}", port),
                "host must not be empty",
            ));
        }
        if port == 0 {
            return Err(Error::invalid_target(
                format!("{}:{}", host, port),
                "port must be in 1..=65535",
            ));
        }

        // Bracketed literals are accepted here too, e.g. from --host [::1]
        let host = match host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            Some(inner) if !inner.is_empty() => inner.to_string(),
            Some(_) => {
                return Err(Error::invalid_target(
                    format!("{}:{}", host, port),
                    "host must not be empty",
                ))
            }
            None => host,
        };

        let target = Self {
            host,
            port,
            security,
        };
        target.validate_authority()?;
        Ok(target)
    }

    /// Reject hosts that would not survive as the authority of the endpoint URI
    fn validate_authority(&self) -> Result<()> {
        let authority = self.authority();

        if self.host.contains(':') && self.host.parse::<Ipv6Addr>().is_err() {
            return Err(Error::invalid_target(authority, "invalid IPv6 address"));
        }

        let parsed = match Authority::from_str(&authority) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(Error::invalid_target(
                    authority,
                    "host contains characters not allowed in a host name",
                ))
            }
        };

        // Userinfo or a smuggled port would move the check to another endpoint
        let host = parsed.host().trim_start_matches('[').trim_end_matches(']');
        if host != self.host || parsed.port_u16() != Some(self.port) {
            return Err(Error::invalid_target(
                authority,
                "host contains characters not allowed in a host name",
            ));
        }

        Ok(())
    }

    /// Create a target from a host and a wide port number
    ///
    /// Used for caller input that has not yet been narrowed to `u16`.
    pub fn from_host_port(host: &str, port: u32, security: SecurityMode) -> Result<Self> {
        let port = u16::try_from(port).map_err(|_| {
            Error::invalid_target(format!("{}:{}", host, port), "port must be in 1..=65535")
        })?;
        Self::new(host, port, security)
    }

    /// Parse a `host:port` (or `[ipv6]:port`) target string
    pub fn parse(input: &str, security: SecurityMode) -> Result<Self> {
        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| Error::invalid_target(input, "unterminated '[' in IPv6 address"))?;
            let port = after
                .strip_prefix(':')
                .ok_or_else(|| Error::invalid_target(input, "expected HOST:PORT"))?;
            (host, port)
        } else {
            let (host, port) = input
                .rsplit_once(':')
                .ok_or_else(|| Error::invalid_target(input, "expected HOST:PORT"))?;
            if host.contains(':') {
                return Err(Error::invalid_target(
                    input,
                    "IPv6 addresses must be enclosed in brackets, e.g. [::1]:50051",
                ));
            }
            (host, port)
        };

        if host.is_empty() {
            return Err(Error::invalid_target(input, "host must not be empty"));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| Error::invalid_target(input, "port must be in 1..=65535"))?;

        Self::new(host, port, security).map_err(|e| match e {
            Error::InvalidTarget { reason, .. } => Error::invalid_target(input, reason),
            other => other,
        })
    }

    /// Host name or IP literal (without brackets)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Transport security mode
    pub fn security(&self) -> SecurityMode {
        self.security
    }

    /// `host:port` authority, bracketing IPv6 literals
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Endpoint URI for the channel, e.g. `http://localhost:50051`
    pub fn uri(&self) -> String {
        format!("{}://{}", self.security.scheme(), self.authority())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port() {
        let target = Target::parse("localhost:50051", SecurityMode::Plaintext).unwrap();
        assert_eq!(target.host(), "localhost");
        assert_eq!(target.port(), 50051);
        assert_eq!(target.uri(), "http://localhost:50051");
    }

    #[test]
    fn test_parse_tls_uses_https() {
        let target = Target::parse("example.com:443", SecurityMode::Tls).unwrap();
        assert_eq!(target.uri(), "https://example.com:443");
        assert!(target.security().is_tls());
    }

    #[test]
    fn test_parse_bracketed_ipv6() {
        let target = Target::parse("[::1]:50051", SecurityMode::Plaintext).unwrap();
        assert_eq!(target.host(), "::1");
        assert_eq!(target.authority(), "[::1]:50051");
        assert_eq!(target.to_string(), "[::1]:50051");
    }

    #[test]
    fn test_parse_rejects_unbracketed_ipv6() {
        let err = Target::parse("::1:50051", SecurityMode::Plaintext).unwrap_err();
        assert!(err.to_string().contains("brackets"));
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        assert!(Target::parse("localhost", SecurityMode::Plaintext).is_err());
        assert!(Target::parse("localhost:", SecurityMode::Plaintext).is_err());
        assert!(Target::parse("[::1]", SecurityMode::Plaintext).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_host() {
        let err = Target::parse(":50051", SecurityMode::Plaintext).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
        assert!(Target::parse("[]:50051", SecurityMode::Plaintext).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_port() {
        assert!(Target::parse("localhost:0", SecurityMode::Plaintext).is_err());
        assert!(Target::parse("localhost:65536", SecurityMode::Plaintext).is_err());
        assert!(Target::parse("localhost:-1", SecurityMode::Plaintext).is_err());
        assert!(Target::parse("localhost:65535", SecurityMode::Plaintext).is_ok());
    }

    #[test]
    fn test_parse_error_keeps_original_input() {
        let err = Target::parse("localhost:0", SecurityMode::Plaintext).unwrap_err();
        assert!(err.to_string().contains("'localhost:0'"));
    }

    #[test]
    fn test_from_host_port() {
        let target = Target::from_host_port("db", 5432, SecurityMode::Plaintext).unwrap();
        assert_eq!(target.authority(), "db:5432");

        assert!(Target::from_host_port("db", 70000, SecurityMode::Plaintext).is_err());
        assert!(Target::from_host_port("", 5432, SecurityMode::Plaintext).is_err());
        assert!(Target::from_host_port("db", 0, SecurityMode::Plaintext).is_err());
    }

    #[test]
    fn test_new_strips_brackets() {
        let target = Target::new("[fe80::1]", 8080, SecurityMode::Plaintext).unwrap();
        assert_eq!(target.host(), "fe80::1");
        assert_eq!(target.uri(), "http://[fe80::1]:8080");
    }

    #[test]
    fn test_rejects_host_that_moves_the_port() {
        let err = Target::parse("127.0.0.1/x:36491", SecurityMode::Plaintext).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
        assert!(err.to_string().contains("'127.0.0.1/x:36491'"));

        for host in ["127.0.0.1/x", "db?x", "db#x", "user@db", "my db", "db]", "[::1"] {
            assert!(
                Target::new(host, 50051, SecurityMode::Plaintext).is_err(),
                "accepted host {:?}",
                host
            );
        }
    }

    #[test]
    fn test_rejects_invalid_ipv6_literal() {
        assert!(Target::parse("[not:v6]:50051", SecurityMode::Plaintext).is_err());
        assert!(Target::new("a:b", 50051, SecurityMode::Plaintext).is_err());
        assert!(Target::new("::1", 50051, SecurityMode::Plaintext).is_ok());
    }

    #[test]
    fn test_accepts_ordinary_hosts() {
        for host in ["localhost", "grpc-server", "api.example.com", "10.0.0.7"] {
            let target = Target::new(host, 443, SecurityMode::Tls).unwrap();
            assert_eq!(target.host(), host);
        }
    }

    #[test]
    fn test_security_mode_from_flag() {
        assert_eq!(SecurityMode::from_tls_flag(true), SecurityMode::Tls);
        assert_eq!(SecurityMode::from_tls_flag(false), SecurityMode::Plaintext);
        assert_eq!(SecurityMode::default(), SecurityMode::Plaintext);
    }
}
