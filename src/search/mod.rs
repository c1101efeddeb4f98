//! Search gateway backed by the Invidious API.
//!
//! `GET <instance>/api/v1/search?q=<query>&type=video` returns a relevance
//! ranked array; we keep the first [`MAX_RESULTS`] video items in that order.

use crate::{
    error::GatewayError,
    models::{SearchResult, VideoSummary},
    network::HttpClient,
};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const MAX_RESULTS: usize = 10;
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousVideo {
    video_id: String,
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    length_seconds: u64,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    live_now: bool,
    #[serde(default)]
    video_thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    quality: String,
    url: String,
}

#[derive(Clone)]
pub struct SearchClient {
    http: HttpClient,
    base: Url,
}

impl SearchClient {
    pub fn new(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GatewayError> {
        Ok(self
            .search_summaries(query)
            .await?
            .into_iter()
            .map(SearchResult::from)
            .collect())
    }

    pub async fn search_summaries(&self, query: &str) -> Result<Vec<VideoSummary>, GatewayError> {
        let endpoint = self.endpoint(query)?;
        let body = self.http.get_json(endpoint).await.map_err(|err| {
            tracing::warn!(query, "search provider call failed: {err}");
            GatewayError::SearchFailed(err.to_string())
        })?;
        let results = map_candidates(&self.base, body)?;
        tracing::info!(query, results = results.len(), "search completed");
        Ok(results)
    }

    fn endpoint(&self, query: &str) -> Result<Url, GatewayError> {
        let mut endpoint = self.base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| {
                GatewayError::SearchFailed(format!("search base {} cannot take a path", self.base))
            })?
            .pop_if_empty()
            .extend(["api", "v1", "search"]);
        endpoint.set_query(None);
        endpoint
            .query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "video");
        Ok(endpoint)
    }
}

fn map_candidates(base: &Url, body: Value) -> Result<Vec<VideoSummary>, GatewayError> {
    let Value::Array(items) = body else {
        return Err(GatewayError::SearchFailed(
            "provider did not return a result list".into(),
        ));
    };

    items
        .into_iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("video"))
        .take(MAX_RESULTS)
        .map(|item| {
            let video: InvidiousVideo = serde_json::from_value(item)
                .map_err(|err| GatewayError::SearchFailed(format!("malformed result: {err}")))?;
            Ok(summarize(base, video))
        })
        .collect()
}

fn summarize(base: &Url, video: InvidiousVideo) -> VideoSummary {
    let thumbnail = video
        .video_thumbnails
        .iter()
        .find(|t| t.quality == "high")
        .or_else(|| video.video_thumbnails.first())
        .map(|t| absolute(base, &t.url))
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video.video_id));

    let duration = if video.live_now || video.length_seconds == 0 {
        None
    } else {
        Some(format_duration(video.length_seconds))
    };

    VideoSummary {
        url: format!("{WATCH_URL}{}", video.video_id),
        id: video.video_id,
        title: video.title,
        thumbnail,
        duration,
        channel: video.author,
        views: video.view_count,
    }
}

// Some instances hand out thumbnails relative to themselves.
fn absolute(base: &Url, link: &str) -> String {
    match Url::parse(link) {
        Ok(url) => url.into(),
        Err(_) => base
            .join(link)
            .map(String::from)
            .unwrap_or_else(|_| link.to_string()),
    }
}

/// `m:ss` below an hour, `h:mm:ss` above.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
