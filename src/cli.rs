use crate::config::AppConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve YouTube links into direct download URLs")]
pub struct Cli {
    /// Address the HTTP API binds to
    #[arg(long, global = true)]
    pub bind: Option<String>,
    /// Base URL of the resolution API
    #[arg(long, global = true)]
    pub resolver_url: Option<String>,
    /// Base URL of the Invidious instance used for search
    #[arg(long, global = true)]
    pub search_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve,
    /// Resolve one YouTube URL and print the result
    Fetch { url: String },
    /// Search YouTube and print the first results
    Search { query: String },
    /// Print the raw resolver response for a video id
    VideoInfo { video_id: String },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Flags win over the environment.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(bind) = &self.bind {
            config.api_bind_addr = bind.clone();
        }
        if let Some(url) = &self.resolver_url {
            config.resolver_base_url = url.clone();
        }
        if let Some(url) = &self.search_url {
            config.search_base_url = url.clone();
        }
        config
    }
}
