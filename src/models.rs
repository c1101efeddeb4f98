use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// A video as returned by the resolution API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResult {
    pub status: bool,
    pub creator: String,
    pub title: String,
    pub thumbnail: String,
    pub audio: String,
    /// Quality label ("720", "480", ...) to direct download URL.
    pub videos: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub quality: String,
    pub download_url: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Insert payload for the history store; `id` and `timestamp` are assigned on add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryEntry {
    pub title: String,
    pub thumbnail: String,
    pub quality: String,
    pub download_url: String,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub url: String,
}

/// Search candidate with channel and view count, served by `GET /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub channel: String,
    pub views: u64,
    pub url: String,
}

impl From<VideoSummary> for SearchResult {
    fn from(summary: VideoSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            thumbnail: summary.thumbnail,
            duration: summary.duration,
            url: summary.url,
        }
    }
}
