//! Channel construction
//!
//! Builds a lazily-connected [`Channel`] for a [`Target`]. Nothing touches the
//! network here: connection establishment is deferred to the first RPC, so a
//! refused or unreachable endpoint surfaces from the invoker, not the builder.

use std::time::Duration;

use thiserror::Error;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::target::Target;

/// Failure to construct a channel handle
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target did not form a valid endpoint URI
    #[error("invalid endpoint URI '{uri}': {reason}")]
    InvalidUri {
        /// URI that was rejected
        uri: String,
        /// Parser message
        reason: String,
    },

    /// The TLS configuration was rejected by the transport
    #[error("TLS configuration rejected: {0}")]
    Tls(#[source] tonic::transport::Error),
}

/// Build a channel to `target`
///
/// Plaintext targets get no TLS configuration at all. TLS targets verify the
/// server against the platform's native root store with the target host as
/// the expected server name. `connect_timeout` bounds TCP connect and the TLS
/// handshake once the first call is made.
pub fn build(target: &Target, connect_timeout: Duration) -> Result<Channel, TransportError> {
    let uri = target.uri();
    let mut endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|e| TransportError::InvalidUri {
            uri,
            reason: e.to_string(),
        })?
        .connect_timeout(connect_timeout);

    if target.security().is_tls() {
        let tls = ClientTlsConfig::new()
            .domain_name(target.host())
            .with_native_roots();
        endpoint = endpoint.tls_config(tls).map_err(TransportError::Tls)?;
    }

    tracing::debug!(
        uri = %endpoint.uri(),
        security = %target.security(),
        connect_timeout_ms = connect_timeout.as_millis() as u64,
        "Built lazy gRPC channel"
    );

    Ok(endpoint.connect_lazy())
}
