use anyhow::{bail, Context, Result};
use url::Url;

pub const ENV_BIND: &str = "TUBEFETCH_BIND";
pub const ENV_RESOLVER_URL: &str = "TUBEFETCH_RESOLVER_URL";
pub const ENV_SEARCH_URL: &str = "TUBEFETCH_SEARCH_URL";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_bind_addr: String,
    pub resolver_base_url: String,
    pub search_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_bind_addr: "127.0.0.1:8472".to_string(),
            resolver_base_url: "https://yt-dl.officialhectormanuel.workers.dev".to_string(),
            search_base_url: "https://yewtu.be".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whichever keys `lookup` knows about; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(bind) = get(ENV_BIND) {
            config.api_bind_addr = bind;
        }
        if let Some(url) = get(ENV_RESOLVER_URL) {
            config.resolver_base_url = url;
        }
        if let Some(url) = get(ENV_SEARCH_URL) {
            config.search_base_url = url;
        }
        config
    }

    pub fn resolver_url(&self) -> Result<Url> {
        parse_base(&self.resolver_base_url).context("invalid resolver base URL")
    }

    pub fn search_url(&self) -> Result<Url> {
        parse_base(&self.search_base_url).context("invalid search base URL")
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("cannot parse {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{raw:?} is not an http(s) URL");
    }
    Ok(url)
}
