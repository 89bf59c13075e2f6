//! Example App gRPC Service
//!
//! A gRPC service implementation for managing books.
//!
//! ## Features
//!
//! - Create, read, delete and list books
//! - Filtering, ordering and pagination of list results
//! - Request transactions with nested savepoints
//! - gRPC reflection support
//! - Structured logging and tracing

use tokio::signal;
use tonic::transport::Server;
use tracing::info;

use example_app_api::v1::{FILE_DESCRIPTOR_SET, example_app_server::ExampleAppServer};
use example_app_service::{
    config::AppConfig, create_book_adapter, error::AppResult, tracing::tracer::Tracer,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::load()?;

    Tracer::install(&config)?;

    info!(
        "Starting {} v{}",
        config.distribution.name,
        config.distribution.version.as_deref().unwrap_or_default(),
    );

    start(&config).await?;

    Ok(())
}

async fn start(config: &AppConfig) -> AppResult<()> {
    let book_adapter = create_book_adapter(config);

    let grpc_server = Server::builder()
        .add_service(
            tonic_reflection::server::Builder::configure()
                .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
                // Some clients only work with v1alpha
                .build_v1alpha()?,
        )
        .add_service(ExampleAppServer::new(book_adapter));

    info!("gRPC server started at {}", config.server.grpc_address);

    grpc_server
        .serve_with_shutdown(config.server.grpc_address, async {
            if signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;

    Ok(())
}
