//! Example gRPC server with the health service enabled
//!
//! Serves `grpc.health.v1.Health` on port 50051 with a fixed set of statuses so
//! the probe can be exercised by hand.
//!
//! Run with: cargo run -p grpc-healthcheck --example example-server
//!
//! Test with:
//!   grpc-healthcheck --target localhost:50051
//!   grpc-healthcheck --target localhost:50051 --service example.Service
//!   grpc-healthcheck --target localhost:50051 --service example.AnotherService

use std::net::SocketAddr;

use grpc_healthcheck::config::LoggingConfig;
use grpc_healthcheck::observability::init_tracing;
use tonic::transport::Server;
use tonic_health::ServingStatus;

const PORT: u16 = 50051;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&LoggingConfig {
        level: "info".to_string(),
        ..Default::default()
    });

    let (reporter, health_service) = tonic_health::server::health_reporter();

    reporter.set_service_status("", ServingStatus::Serving).await;
    reporter
        .set_service_status("example.Service", ServingStatus::Serving)
        .await;
    reporter
        .set_service_status("example.AnotherService", ServingStatus::NotServing)
        .await;

    let addr: SocketAddr = format!("[::]:{}", PORT).parse()?;

    println!("🚀 Example gRPC server started on port {}", PORT);
    println!("   Overall health: SERVING");
    println!("   example.Service: SERVING");
    println!("   example.AnotherService: NOT_SERVING");
    println!();
    println!("Test with:");
    println!("   grpc-healthcheck --target localhost:{}", PORT);
    println!(
        "   grpc-healthcheck --target localhost:{} --service example.Service",
        PORT
    );
    println!(
        "   grpc-healthcheck --target localhost:{} --service example.AnotherService",
        PORT
    );
    println!();
    println!("Press Ctrl+C to stop");

    Server::builder()
        .add_service(health_service)
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            println!();
            println!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}
