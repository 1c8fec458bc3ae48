//! Video data consumers
//!
//! Thin shape-transformers layered on the quota-aware fetcher: search,
//! trending, and detail lookup. These functions never return an error to
//! their caller — any unrecoverable fetch failure degrades to an empty list,
//! so the worst the frontend ever sees is "no data".

use crate::schemas::videos::{ItemListResponse, SearchResult, VideoRecord, VideoResource};
use crate::services::fetcher::QuotaAwareFetcher;
use std::sync::Arc;

const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";

/// Search, trending, and detail lookups over the external video-data API
pub struct VideoService {
    fetcher: Arc<QuotaAwareFetcher>,
    max_retries: u32,
}

impl VideoService {
    pub fn new(fetcher: Arc<QuotaAwareFetcher>, max_retries: u32) -> Self {
        Self {
            fetcher,
            max_retries,
        }
    }

    /// Search for videos matching `query`.
    ///
    /// Two upstream calls: a search for matching video IDs, then a detail
    /// lookup for those IDs, so results carry statistics and durations the
    /// search resource does not include.
    pub async fn search(&self, query: &str, max_results: u32) -> Vec<VideoRecord> {
        let params = [
            ("part", "id".to_string()),
            ("type", "video".to_string()),
            ("q", query.to_string()),
            ("maxResults", max_results.to_string()),
        ];

        let envelope: ItemListResponse<SearchResult> =
            match self.fetcher.get("search", &params, self.max_retries).await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => return Vec::new(),
                Err(err) => {
                    tracing::warn!(query, error = %err, "Video search failed, returning no results");
                    return Vec::new();
                }
            };

        let ids: Vec<String> = envelope
            .items
            .into_iter()
            .filter_map(|result| result.id.video_id)
            .collect();

        if ids.is_empty() {
            return Vec::new();
        }

        self.details(&ids).await
    }

    /// Most-popular chart listing
    pub async fn trending(&self, max_results: u32) -> Vec<VideoRecord> {
        let params = [
            ("part", VIDEO_PARTS.to_string()),
            ("chart", "mostPopular".to_string()),
            ("maxResults", max_results.to_string()),
        ];
        self.fetch_videos(&params, "trending fetch").await
    }

    /// Detail lookup for an explicit ID list
    pub async fn details(&self, ids: &[String]) -> Vec<VideoRecord> {
        if ids.is_empty() {
            return Vec::new();
        }
        let params = [
            ("part", VIDEO_PARTS.to_string()),
            ("id", ids.join(",")),
        ];
        self.fetch_videos(&params, "detail fetch").await
    }

    async fn fetch_videos(&self, params: &[(&str, String)], what: &str) -> Vec<VideoRecord> {
        match self
            .fetcher
            .get::<ItemListResponse<VideoResource>>("videos", params, self.max_retries)
            .await
        {
            Ok(Some(envelope)) => envelope.items.into_iter().map(VideoRecord::from).collect(),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "Video {what} failed, returning no results");
                Vec::new()
            }
        }
    }
}
