//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::config::Settings;
use crate::services::key_pool::{KeyPool, PoolConfig};
use crate::services::{QuotaAwareFetcher, VideoService};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared application state
///
/// Holds the shared resources handlers need access to. Cheaply cloneable via
/// Arc and thread-safe; the key pool serializes its own mutations internally.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Key pool, shared between the fetcher and the admin surface
    pub pool: Arc<KeyPool>,

    /// Video data consumers layered on the quota-aware fetcher
    pub videos: Arc<VideoService>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    ///
    /// Builds the key pool from the configured key slots, the quota-aware
    /// fetcher on top of it, and the video service on top of that.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);
        let start_time = Instant::now();

        let pool_config = PoolConfig::default()
            .with_max_usage(settings.video_api.max_usage_per_key)
            .with_switch_threshold(settings.video_api.switch_threshold)
            .with_surface_switch_failure(settings.video_api.surface_switch_failure);
        let pool = Arc::new(KeyPool::new(settings.video_api.keys.clone(), pool_config));

        let fetcher = QuotaAwareFetcher::new(
            settings.video_api.base_url.clone(),
            pool.clone(),
            Duration::from_secs(settings.video_api.timeout_seconds),
        )?;

        let videos = Arc::new(VideoService::new(
            Arc::new(fetcher),
            settings.video_api.max_retries,
        ));

        tracing::info!(
            base_url = %settings.video_api.base_url,
            key_count = pool.len(),
            "Application state initialized"
        );

        Ok(Self {
            settings,
            pool,
            videos,
            start_time,
        })
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_builds_pool_from_settings() {
        let mut settings = Settings::default();
        settings.video_api.keys = vec!["key-a".to_string(), "key-b".to_string()];

        let state = AppState::new(settings).unwrap();
        assert_eq!(state.pool.len(), 2);
        assert_eq!(state.pool.snapshot().active_slot_count, 2);
    }

    #[test]
    fn test_state_with_no_keys_is_valid() {
        let state = AppState::new(Settings::default()).unwrap();
        assert!(state.pool.is_empty());
    }
}
