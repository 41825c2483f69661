//! # SpeakMatch API
//!
//! The API crate provides the web server for the SpeakMatch speaking-session
//! platform: room lifecycle (create/join/leave), live speaking requests with
//! interactive notifications, future-dated session scheduling, and SSE
//! streams backed by the realtime subsystem.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic over the repositories
//! - **Middleware**: Error mapping from domain errors to HTTP responses
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database
//! interactions; realtime state (channel registry, presence hub,
//! notification center) is owned by the shared state and torn down on
//! shutdown.

/// Configuration module for API settings
pub mod config;
/// Outbound email notification client
pub mod email;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use speakmatch_realtime::{ChannelRegistry, NotificationCenter, PresenceHub};

use crate::email::EmailClient;

/// Shared application state that is accessible to all request handlers.
///
/// Besides the database pool this carries the realtime registries, which
/// are constructed once per server so tests can instantiate independent
/// instances.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Active realtime channel subscriptions, keyed per room
    pub channels: ChannelRegistry,
    /// Ephemeral per-room presence
    pub presence: PresenceHub,
    /// Live speaking-request alerts
    pub notifier: NotificationCenter,
    /// Outbound email client; None when no endpoint is configured
    pub mailer: Option<EmailClient>,
}

/// Starts the API server with the provided configuration and database
/// connection: initializes logging, builds the router, and serves until
/// shutdown, closing all realtime channels on the way out.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        channels: ChannelRegistry::new(),
        presence: PresenceHub::new(),
        notifier: NotificationCenter::new(),
        mailer: config.email_notify_url.clone().map(EmailClient::new),
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Room lifecycle and realtime streams
        .merge(routes::rooms::routes())
        // Live speaking requests and notifications
        .merge(routes::requests::routes())
        // Scheduled session requests
        .merge(routes::schedule::routes())
        // User profile and presence lookups
        .merge(routes::users::routes())
        // Attach shared state to all routes
        .with_state(state.clone());

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
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

    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down; closing realtime channels");
            shutdown_state.channels.cleanup_all();
        })
        .await?;

    Ok(())
}
