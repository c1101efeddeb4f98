//! Fetch gateway: hands a YouTube URL to the resolution API and checks what
//! comes back against the [`VideoResult`] shape.

use crate::{
    error::GatewayError, models::VideoResult, network::HttpClient,
    validation::validate_video_result,
};
use serde_json::Value;
use url::Url;

#[derive(Clone)]
pub struct ResolverClient {
    http: HttpClient,
    base: Url,
}

impl ResolverClient {
    pub fn new(http: HttpClient, base: Url) -> Self {
        Self { http, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET <base>?url=<target>`; the response is returned as-is once it validates.
    pub async fn fetch(&self, target: &Url) -> Result<VideoResult, GatewayError> {
        let body = self.http.get_json(self.fetch_endpoint(target)).await?;
        let video = validate_video_result(&body).map_err(|err| {
            tracing::warn!(%target, "resolver response rejected: {err}");
            GatewayError::SchemaMismatch(err.to_string())
        })?;
        tracing::info!(%target, qualities = video.videos.len(), "video resolved");
        Ok(video)
    }

    /// `GET <base>/<video_id>`, passed through without validation.
    pub async fn video_info(&self, video_id: &str) -> Result<Value, GatewayError> {
        let endpoint = self.video_endpoint(video_id)?;
        self.http.get_json(endpoint).await
    }

    fn fetch_endpoint(&self, target: &Url) -> Url {
        let mut endpoint = self.base.clone();
        endpoint
            .query_pairs_mut()
            .append_pair("url", target.as_str());
        endpoint
    }

    fn video_endpoint(&self, video_id: &str) -> Result<Url, GatewayError> {
        let mut endpoint = self.base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| GatewayError::UpstreamUnavailable {
                status: None,
                message: format!("resolver base {} cannot take a path", self.base),
            })?
            .pop_if_empty()
            .push(video_id);
        endpoint.set_query(None);
        Ok(endpoint)
    }
}
