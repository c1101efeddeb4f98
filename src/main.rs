use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tubefetch::{
    api::{self, AppState},
    cli,
    config::AppConfig,
    history::HistoryStore,
    network::HttpClient,
    resolver::ResolverClient,
    search::SearchClient,
    validation,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubefetch=info,tower_http=info")),
        )
        .init();

    let args = cli::Cli::parse_args();
    let config = args.apply(AppConfig::from_env());

    let http = HttpClient::new();
    let resolver = ResolverClient::new(http.clone(), config.resolver_url()?);
    let search = SearchClient::new(http, config.search_url()?);

    match args.command {
        cli::Command::Serve => {
            let state = AppState::new(resolver, search, Arc::new(HistoryStore::new()));
            api::serve(config.api_bind_addr, state).await?;
        }
        cli::Command::Fetch { url } => {
            let request = validation::validate_fetch_request(&serde_json::json!({ "url": url }))?;
            let video = resolver
                .fetch(&request.url)
                .await
                .context("resolving video")?;
            println!("{}", serde_json::to_string_pretty(&video)?);
        }
        cli::Command::Search { query } => {
            let request =
                validation::validate_search_request(&serde_json::json!({ "query": query }))?;
            let results = search
                .search_summaries(&request.query)
                .await
                .context("searching")?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        cli::Command::VideoInfo { video_id } => {
            let video_id = validation::require_param("video-id", Some(video_id.as_str()))?;
            let info = resolver
                .video_info(&video_id)
                .await
                .context("fetching video info")?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
