//! Administrative key-pool endpoints
//!
//! Observability and manual controls for the key pool: a status snapshot for
//! a dashboard, a "reset quota" action, and a "force key switch" action.
//! Secrets are never included in any response.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::server::state::AppState;
use crate::services::key_pool::PoolSnapshot;

/// GET /admin/pool
pub async fn pool_status(State(state): State<AppState>) -> Json<PoolSnapshot> {
    Json(state.pool.snapshot())
}

/// POST /admin/pool/reset
///
/// Clears every failed flag and zeroes all usage counters, then returns the
/// resulting snapshot.
pub async fn reset_pool(State(state): State<AppState>) -> Json<PoolSnapshot> {
    state.pool.reset_all();
    Json(state.pool.snapshot())
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub current_index: usize,
}

/// POST /admin/pool/advance
///
/// Manually rotates to the next usable key. Responds 503 when every key is
/// failed or at its ceiling.
pub async fn advance_pool(
    State(state): State<AppState>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    state.pool.advance().map_err(|_| ApiError::PoolExhausted)?;
    Ok(Json(AdvanceResponse {
        current_index: state.pool.snapshot().current_index,
    }))
}
