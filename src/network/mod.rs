use crate::error::GatewayError;
use serde_json::Value;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HttpClient {
    pub client: reqwest::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Single GET decoded as JSON. Transport errors and non-2xx statuses are
    /// `UpstreamUnavailable`; a body that is not JSON is `SchemaMismatch`.
    pub async fn get_json(&self, url: Url) -> Result<Value, GatewayError> {
        tracing::info!(%url, "upstream request");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| GatewayError::UpstreamUnavailable {
                status: err.status().map(|s| s.as_u16()),
                message: format!("request to {} failed: {err}", host_of(&url)),
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, host = host_of(&url), "upstream returned an error status");
            return Err(GatewayError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                message: format!("{} answered with {status}", host_of(&url)),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|err| GatewayError::UpstreamUnavailable {
                status: None,
                message: format!("reading response from {} failed: {err}", host_of(&url)),
            })?;

        serde_json::from_slice(&body)
            .map_err(|err| GatewayError::SchemaMismatch(format!("body is not valid JSON: {err}")))
    }
}

fn host_of(url: &Url) -> &str {
    url.host_str().unwrap_or("upstream")
}
