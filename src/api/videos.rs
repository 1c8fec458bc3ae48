//! Video data endpoints
//!
//! Thin handlers over the `VideoService`. These endpoints never surface an
//! upstream failure as an error status: the service layer already degrades to
//! an empty list, so the frontend always gets a well-formed JSON array.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::schemas::videos::VideoRecord;
use crate::server::state::AppState;

/// Upstream hard cap on list sizes
const MAX_RESULTS_CAP: u32 = 50;

fn default_max_results() -> u32 {
    25
}

fn clamp_max_results(requested: u32) -> u32 {
    requested.clamp(1, MAX_RESULTS_CAP)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

/// GET /api/videos/search?q=...&max_results=25
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<VideoRecord>> {
    let records = state
        .videos
        .search(&params.q, clamp_max_results(params.max_results))
        .await;
    Json(records)
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

/// GET /api/videos/trending?max_results=25
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Json<Vec<VideoRecord>> {
    let records = state
        .videos
        .trending(clamp_max_results(params.max_results))
        .await;
    Json(records)
}

#[derive(Debug, Deserialize)]
pub struct DetailsParams {
    /// Comma-separated video IDs
    pub ids: String,
}

/// GET /api/videos/details?ids=a,b,c
pub async fn details(
    State(state): State<AppState>,
    Query(params): Query<DetailsParams>,
) -> Json<Vec<VideoRecord>> {
    let ids: Vec<String> = params
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    Json(state.videos.details(&ids).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_max_results() {
        assert_eq!(clamp_max_results(0), 1);
        assert_eq!(clamp_max_results(25), 25);
        assert_eq!(clamp_max_results(500), MAX_RESULTS_CAP);
    }
}
