//! Video-data API wire shapes and normalization
//!
//! Wire types mirror the upstream JSON (camelCase, `{ "items": [...] }`
//! envelopes, stringly-typed counters); `VideoRecord` is the normalized shape
//! the inbound API serves to the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Upstream wire shapes
// ============================================================================

/// Generic list envelope returned by every upstream resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One search hit; search results carry the video ID nested one level down
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// Full video resource as returned by the details/trending endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<VideoSnippet>,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
    #[serde(default)]
    pub content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Counters arrive as strings on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
    #[serde(default)]
    pub duration: Option<String>,
}

// ============================================================================
// Normalized record
// ============================================================================

/// Shape served to the frontend, normalized from a `VideoResource`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail_url: Option<String>,
    pub view_count: Option<u64>,
    /// ISO 8601 duration as sent by the upstream (e.g. "PT4M13S")
    pub duration: Option<String>,
}

impl From<VideoResource> for VideoRecord {
    fn from(resource: VideoResource) -> Self {
        let snippet = resource.snippet.unwrap_or_else(|| VideoSnippet {
            title: None,
            description: None,
            channel_title: None,
            published_at: None,
            thumbnails: None,
        });

        let thumbnail_url = snippet.thumbnails.and_then(|t| {
            // Best available resolution first
            t.high
                .or(t.medium)
                .or(t.default)
                .map(|thumb| thumb.url)
        });

        let published_at = snippet.published_at.as_deref().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });

        let view_count = resource
            .statistics
            .and_then(|s| s.view_count)
            .and_then(|v| v.parse::<u64>().ok());

        Self {
            id: resource.id,
            title: snippet.title.unwrap_or_default(),
            description: snippet.description.unwrap_or_default(),
            channel_title: snippet.channel_title.unwrap_or_default(),
            published_at,
            thumbnail_url,
            view_count,
            duration: resource.content_details.and_then(|d| d.duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_VIDEO: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "snippet": {
            "title": "Sample Video",
            "description": "A description",
            "channelTitle": "Sample Channel",
            "publishedAt": "2024-03-01T12:00:00Z",
            "thumbnails": {
                "default": {"url": "https://img.example/default.jpg"},
                "high": {"url": "https://img.example/high.jpg"}
            }
        },
        "statistics": {"viewCount": "123456", "likeCount": "789"},
        "contentDetails": {"duration": "PT4M13S"}
    }"#;

    #[test]
    fn test_normalize_full_resource() {
        let resource: VideoResource = serde_json::from_str(SAMPLE_VIDEO).unwrap();
        let record = VideoRecord::from(resource);

        assert_eq!(record.id, "dQw4w9WgXcQ");
        assert_eq!(record.title, "Sample Video");
        assert_eq!(record.channel_title, "Sample Channel");
        assert_eq!(record.view_count, Some(123_456));
        assert_eq!(record.duration.as_deref(), Some("PT4M13S"));
        // Highest available thumbnail wins
        assert_eq!(
            record.thumbnail_url.as_deref(),
            Some("https://img.example/high.jpg")
        );
        assert!(record.published_at.is_some());
    }

    #[test]
    fn test_normalize_sparse_resource() {
        let resource: VideoResource = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        let record = VideoRecord::from(resource);

        assert_eq!(record.id, "abc");
        assert_eq!(record.title, "");
        assert!(record.thumbnail_url.is_none());
        assert!(record.view_count.is_none());
        assert!(record.published_at.is_none());
    }

    #[test]
    fn test_search_envelope_with_missing_video_ids() {
        let body = r#"{
            "items": [
                {"id": {"videoId": "vid-1"}},
                {"id": {"kind": "playlist"}},
                {"id": {"videoId": "vid-2"}}
            ]
        }"#;
        let envelope: ItemListResponse<SearchResult> = serde_json::from_str(body).unwrap();
        let ids: Vec<String> = envelope
            .items
            .into_iter()
            .filter_map(|r| r.id.video_id)
            .collect();
        assert_eq!(ids, vec!["vid-1", "vid-2"]);
    }

    #[test]
    fn test_empty_envelope_defaults() {
        let envelope: ItemListResponse<VideoResource> = serde_json::from_str("{}").unwrap();
        assert!(envelope.items.is_empty());
        assert!(envelope.next_page_token.is_none());
    }

    #[test]
    fn test_non_numeric_view_count_tolerated() {
        let resource: VideoResource = serde_json::from_str(
            r#"{"id": "abc", "statistics": {"viewCount": "n/a"}}"#,
        )
        .unwrap();
        let record = VideoRecord::from(resource);
        assert!(record.view_count.is_none());
    }
}
