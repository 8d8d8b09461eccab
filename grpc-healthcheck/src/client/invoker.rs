//! Single `grpc.health.v1.Health/Check` call

use std::time::Duration;

use tonic::transport::Channel;
use tonic::{Request, Status};
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::{HealthCheckRequest, HealthCheckResponse};

use crate::query::HealthQuery;

/// What came back from the one RPC attempt, before interpretation
#[derive(Debug)]
pub enum RawResult {
    /// The server replied with a health status
    Reply(HealthCheckResponse),
    /// The call failed with a gRPC status (remote or transport generated)
    Status(Status),
    /// No reply of any kind arrived before the deadline
    Elapsed(Duration),
}

/// Issue exactly one `Check` call over `channel`
///
/// The deadline is sent to the server as `grpc-timeout` and also enforced
/// locally, so the call is abandoned at the deadline even if the host is
/// unreachable or the server never answers. There is no retry. The channel is
/// consumed and released when this returns.
pub async fn invoke(channel: Channel, query: &HealthQuery) -> RawResult {
    let mut client = HealthClient::new(channel);

    let mut request = Request::new(HealthCheckRequest {
        service: query.service().to_string(),
    });
    request.set_timeout(query.deadline());

    tracing::debug!(
        service = query.service(),
        deadline_ms = query.deadline().as_millis() as u64,
        "Sending Health/Check"
    );

    match tokio::time::timeout(query.deadline(), client.check(request)).await {
        Ok(Ok(response)) => RawResult::Reply(response.into_inner()),
        Ok(Err(status)) => {
            tracing::debug!(code = ?status.code(), message = status.message(), "Health/Check failed");
            RawResult::Status(status)
        }
        Err(_) => {
            tracing::debug!("Health/Check abandoned at deadline");
            RawResult::Elapsed(query.deadline())
        }
    }
}
