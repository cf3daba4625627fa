//! # Slotbook API
//!
//! The API crate provides the web server implementation for the Slotbook
//! reservation engine. It exposes RESTful endpoints for facility reservation
//! settings, slot listings, reservation management, and the
//! pending-to-confirmed workflow.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Workflow**: The confirmation state machine and notification fanout
//! - **Gateway**: Clients for the privileged backend and the external relay
//! - **Middleware**: Owner identity extraction and error mapping
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Privileged backend gateway and external relay clients
pub mod gateway;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for identity extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// Confirmation workflow and notification fanout
pub mod workflow;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use slotbook_db::capabilities::SchemaCapabilities;

use crate::gateway::{ExternalRelay, HttpGateway, HttpRelay, LogOnlyRelay, PrivilegedGateway};

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Optional-column descriptor probed once at startup
    pub capabilities: SchemaCapabilities,
    /// Privileged backend route used when direct mutations are blocked
    pub gateway: Arc<dyn PrivilegedGateway>,
    /// Best-effort external messaging channel
    pub relay: Arc<dyn ExternalRelay>,
}

/// Starts the API server with the provided configuration and database
/// connection.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Probe the deployment schema once; repositories pick their column
    // lists from this descriptor instead of discovering drift per call.
    let capabilities = SchemaCapabilities::detect(&db_pool).await?;

    let gateway: Arc<dyn PrivilegedGateway> = Arc::new(HttpGateway::new(&config.gateway_url));
    let relay: Arc<dyn ExternalRelay> = match &config.relay_url {
        Some(url) => Arc::new(HttpRelay::new(url)),
        None => Arc::new(LogOnlyRelay),
    };

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        capabilities,
        gateway,
        relay,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Reservation settings endpoints
        .merge(routes::settings::routes())
        // Slot listing endpoints
        .merge(routes::slots::routes())
        // Reservation management endpoints
        .merge(routes::reservations::routes())
        // Notification feed endpoints
        .merge(routes::notifications::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
