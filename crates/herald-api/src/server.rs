//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Panic recovery
//! 4. Handler execution
//!
//! No layer bounds a whole request. Each delivery carries its own timeout,
//! so a dispatch cycle always runs every matched action.
//!
//! # Graceful Shutdown
//!
//! The server stops accepting connections on CTRL+C or SIGTERM and lets
//! in-flight dispatch cycles finish.

use std::net::SocketAddr;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::{handlers, AppState};

/// Response header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use herald_api::{create_router, AppState, RuleSource, RuleStore};
/// use herald_core::{Dispatcher, EnvResolver};
/// use herald_delivery::DeliveryClient;
///
/// let rules = RuleStore::from_source(RuleSource::Builtin).unwrap();
/// let client = DeliveryClient::with_defaults().unwrap();
/// let dispatcher = Dispatcher::new(Arc::new(client), Arc::new(EnvResolver));
/// let app = create_router(AppState::new(rules, dispatcher));
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::receive_webhook))
        .route("/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound.
pub async fn start_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
