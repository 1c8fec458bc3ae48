//! Quota-aware request execution
//!
//! This module executes one logical GET against the external video-data API,
//! transparently rotating API keys on failure within a bounded retry budget.
//! Every outcome is fed back into the [`KeyPool`]; every retry is guaranteed
//! to use a different key than the one that just failed, because the pool
//! rotates inside `record_failure` before the retry fires.

use crate::services::key_pool::{FailureInfo, KeyPool, KeyPoolError};
use crate::utils::retry::Backoff;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default retry budget per logical call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when calling the video-data API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Every configured key is failed or at its ceiling; the one condition no
    /// rotation can recover from
    #[error("all API keys exhausted")]
    PoolExhausted,

    /// Final upstream failure after the retry budget was spent
    #[error("upstream request failed (status {status:?}): {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

// ============================================================================
// Quota-Aware Fetcher
// ============================================================================

/// Issues GET requests to the external API with the key the pool currently
/// selects, rotating on failure.
///
/// Retries are sequential, never fanned out: one attempt is in flight at a
/// time per logical call. The reqwest client timeout bounds each attempt.
pub struct QuotaAwareFetcher {
    client: Client,
    base_url: String,
    pool: Arc<KeyPool>,
    backoff: Backoff,
}

impl QuotaAwareFetcher {
    pub fn new(
        base_url: impl Into<String>,
        pool: Arc<KeyPool>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            pool,
            backoff: Backoff::default(),
        })
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// The pool backing this fetcher (shared with the admin surface)
    pub fn pool(&self) -> &Arc<KeyPool> {
        &self.pool
    }

    /// Execute one logical GET against `<base>/<resource>?<params>&key=<secret>`.
    ///
    /// Returns `Ok(None)` when no keys are configured at all: the service
    /// prefers showing no data over raising an error when nothing is set up.
    /// Non-success statuses and transport failures both go through
    /// rotate-and-retry; exhaustion of either the retry budget or the key
    /// pool surfaces as an error for the caller to degrade on.
    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
        max_retries: u32,
    ) -> Result<Option<T>, FetchError> {
        let mut secret = match self.pool.current() {
            Ok(secret) => secret,
            Err(_) => {
                tracing::debug!(resource, "No API keys configured, serving degraded empty result");
                return Ok(None);
            }
        };

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), resource);
        let mut retries_remaining = max_retries;
        let mut attempt: u32 = 0;

        loop {
            let result = self
                .client
                .get(&url)
                .query(params)
                .query(&[("key", secret.as_str())])
                .send()
                .await;

            let failure = match result {
                Ok(resp) if resp.status().is_success() => {
                    // A surfaced switch failure must not abort a request that
                    // already succeeded; future calls will see the exhaustion.
                    if let Err(err) = self.pool.record_success() {
                        tracing::warn!(
                            error = %err,
                            "Key pool reported exhaustion while recording a successful request"
                        );
                    }
                    return resp
                        .json::<T>()
                        .await
                        .map(Some)
                        .map_err(|e| FetchError::Decode(e.to_string()));
                }
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    FailureInfo::new(Some(status), body)
                }
                Err(err) => FailureInfo::new(err.status().map(|s| s.as_u16()), err.to_string()),
            };

            tracing::warn!(
                resource,
                status = ?failure.status,
                retries_remaining,
                "Upstream request failed"
            );

            match self.pool.record_failure(&failure) {
                Ok(next_secret) => {
                    if retries_remaining == 0 {
                        return Err(FetchError::Upstream {
                            status: failure.status,
                            message: failure.message,
                        });
                    }
                    retries_remaining -= 1;
                    tokio::time::sleep(self.backoff.delay(attempt)).await;
                    attempt += 1;
                    secret = next_secret;
                }
                // Do not spend remaining budget once every key is confirmed dead
                Err(KeyPoolError::AllKeysExhausted) | Err(KeyPoolError::EmptyPool) => {
                    return Err(FetchError::PoolExhausted);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::key_pool::PoolConfig;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn test_pool(count: usize) -> Arc<KeyPool> {
        let secrets = (0..count).map(|i| format!("key-{i}")).collect();
        Arc::new(KeyPool::new(secrets, PoolConfig::default()))
    }

    fn test_fetcher(base_url: &str, pool: Arc<KeyPool>) -> QuotaAwareFetcher {
        QuotaAwareFetcher::new(base_url, pool, Duration::from_secs(2))
            .unwrap()
            .with_backoff(
                Backoff::default()
                    .with_initial_delay(Duration::from_millis(1))
                    .with_jitter(false),
            )
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_empty_pool_degrades_without_network() {
        // The base URL is unroutable on purpose: an empty pool must short-circuit
        let fetcher = test_fetcher("http://127.0.0.1:1", test_pool(0));
        let result: Option<Value> = fetcher.get("videos", &[], 3).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_success_records_usage() {
        let router = Router::new().route(
            "/videos",
            get(|| async { Json(json!({"items": [{"id": "abc123"}]})) }),
        );
        let base = spawn_stub(router).await;

        let pool = test_pool(2);
        let fetcher = test_fetcher(&base, pool.clone());

        let body: Option<Value> = fetcher
            .get("videos", &[("part", "snippet".to_string())], 3)
            .await
            .unwrap();
        assert_eq!(body.unwrap()["items"][0]["id"], "abc123");
        assert_eq!(pool.snapshot().usage_counts, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_retry_rotates_to_fresh_key() {
        // Upstream rejects the first key with a server error; the retry must
        // arrive with a different key and succeed.
        let router = Router::new().route(
            "/videos",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("key").map(String::as_str) == Some("key-0") {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": {"code": 500, "message": "backend error"}})),
                    )
                } else {
                    (StatusCode::OK, Json(json!({"items": []})))
                }
            }),
        );
        let base = spawn_stub(router).await;

        let pool = test_pool(2);
        let fetcher = test_fetcher(&base, pool.clone());

        let body: Option<Value> = fetcher.get("videos", &[], 3).await.unwrap();
        assert!(body.is_some());

        let snap = pool.snapshot();
        // Transient failure did not mark the slot failed, and the success
        // landed on the rotated key
        assert!(snap.failed_indices.is_empty());
        assert_eq!(snap.usage_counts, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_quota_rejection_on_all_keys_aborts_early() {
        let router = Router::new().route(
            "/videos",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": {"code": 403, "message": "quotaExceeded"}})),
                )
            }),
        );
        let base = spawn_stub(router).await;

        let pool = test_pool(2);
        let fetcher = test_fetcher(&base, pool.clone());

        let result: Result<Option<Value>, _> = fetcher.get("videos", &[], 3).await;
        assert!(matches!(result, Err(FetchError::PoolExhausted)));

        // Both keys marked failed after two attempts; the remaining retry
        // budget was not spent on a confirmed-dead pool
        let snap = pool.snapshot();
        assert_eq!(snap.active_slot_count, 0);
        assert_eq!(snap.failed_indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_transport_failure_exhausts_budget_then_surfaces() {
        // Nothing listens here: every attempt is a connection error
        let pool = test_pool(3);
        let fetcher = test_fetcher("http://127.0.0.1:9", pool.clone());

        let result: Result<Option<Value>, _> = fetcher.get("videos", &[], 3).await;
        assert!(matches!(
            result,
            Err(FetchError::Upstream { status: None, .. })
        ));

        let snap = pool.snapshot();
        // One rotation per failed attempt: 4 attempts from slot 0 land on slot 1
        assert_eq!(snap.current_index, 1);
        // Transport failures never mark a slot failed
        assert!(snap.failed_indices.is_empty());
        assert_eq!(snap.usage_counts, vec![0, 0, 0]);
    }
}
