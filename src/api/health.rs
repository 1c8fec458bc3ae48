//! Health check endpoints
//!
//! This module provides health check endpoints for monitoring
//! and container orchestration (Kubernetes, ECS, etc.)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the main health check endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
}

/// Response for readiness probe
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub config_loaded: bool,
    /// Total configured key slots; zero means degraded mode, not unready
    pub key_slots: usize,
    /// Slots currently usable (not failed, under ceiling)
    pub active_key_slots: usize,
}

/// Response for liveness probe
#[derive(Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
}

/// Main health check endpoint
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.app_version.clone(),
        environment: state.settings.environment.to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Readiness probe endpoint
///
/// An empty or exhausted key pool does not make the service unready: serving
/// degraded empty results is a valid operating state, and restarting the
/// instance would not restore quota anyway.
///
/// GET /ready
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let snapshot = state.pool.snapshot();

    let checks = ReadinessChecks {
        config_loaded: true,
        key_slots: snapshot.total_slots,
        active_key_slots: snapshot.active_slot_count,
    };

    let ready = checks.config_loaded;

    if snapshot.total_slots > 0 && snapshot.active_slot_count == 0 {
        tracing::warn!(
            failed = snapshot.failed_indices.len(),
            "All key slots exhausted or failed, serving degraded results"
        );
    }

    (StatusCode::OK, Json(ReadinessResponse { ready, checks }))
}

/// Liveness probe endpoint
///
/// GET /liveness
pub async fn liveness() -> Json<LivenessResponse> {
    // Simple liveness check - if we can respond, we're alive
    Json(LivenessResponse { alive: true })
}
