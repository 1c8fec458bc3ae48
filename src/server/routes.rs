//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{admin, health, videos};
use crate::middleware::logging::{log_request, TRACE_ID_HEADER};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness))
        .route("/liveness", get(health::liveness));

    // Video data routes consumed by the frontend
    let video_routes = Router::new()
        .route("/videos/search", get(videos::search))
        .route("/videos/trending", get(videos::trending))
        .route("/videos/details", get(videos::details));

    // Key-pool observability and manual controls
    let admin_routes = Router::new()
        .route("/pool", get(admin::pool_status))
        .route("/pool/reset", post(admin::reset_pool))
        .route("/pool/advance", post(admin::advance_pool));

    Router::new()
        .nest("/api", video_routes)
        .nest("/admin", admin_routes)
        .merge(health_routes)
        .layer(create_cors_layer())
        // Custom request logging with trace IDs
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Create CORS layer with permissive settings for the browser frontend
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        // Expose the trace ID header to browser clients
        .expose_headers([HeaderName::from_static(TRACE_ID_HEADER)])
}
