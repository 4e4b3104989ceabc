//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable.

use crate::crawler::CrawlerConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the crawler.
///
/// # Examples
///
/// ```sh
/// # Crawl targets harvested from the news API
/// areanews_crawler --api-key-file ./apikey.md -o results.json
///
/// # Crawl explicit URLs, skipping the API
/// areanews_crawler https://news.ycwb.com/ikinvjktjn/content_53731774.htm
///
/// # Only analyze what the API returns
/// areanews_crawler --inspect --keyword 旅游
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article URLs to crawl; when given, the news API is not queried
    pub urls: Vec<String>,

    /// News API key (takes precedence over --api-key-file)
    #[arg(long, env = "AREANEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Plaintext file holding the news API key
    #[arg(long, env = "AREANEWS_API_KEY_FILE", default_value = "apikey.md")]
    pub api_key_file: PathBuf,

    /// Region name passed to the news API
    #[arg(long, env = "AREANEWS_REGION", default_value = "广东")]
    pub region: String,

    /// Keyword for the supplementary API search (empty to disable)
    #[arg(long, env = "AREANEWS_KEYWORD", default_value = "展览")]
    pub keyword: String,

    /// Where to write the JSON results
    #[arg(short, long, env = "AREANEWS_OUTPUT", default_value = "crawler_results.json")]
    pub output: PathBuf,

    /// Per-page fetch timeout in seconds
    #[arg(long, env = "AREANEWS_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// Pause between page fetches in milliseconds
    #[arg(long, env = "AREANEWS_DELAY_MS", default_value_t = 1000)]
    pub delay_ms: u64,

    /// Analyze the API listing and probe article URLs instead of crawling
    #[arg(long)]
    pub inspect: bool,
}

impl Cli {
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            delay: Duration::from_millis(self.delay_ms),
        }
    }

    /// The search keyword, if one is set.
    pub fn keyword(&self) -> Option<&str> {
        Some(self.keyword.trim()).filter(|k| !k.is_empty())
    }
}
