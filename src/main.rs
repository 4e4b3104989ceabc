//! # Area News Crawler
//!
//! Fetches regional Chinese news articles and extracts their full text,
//! writing one JSON record per article.
//!
//! ## Features
//!
//! - Harvests article URLs from a regional news API (one per reporting source),
//!   or takes them from the command line
//! - Per-site body selectors for 南方网, 金羊网 and 中国新闻网, with a generic
//!   `main`/`article`/`#content` fallback for everything else
//! - Title, author and publish-date scraping
//! - `--inspect` mode that summarizes the API listing, probes article URLs and
//!   surveys which outlets the API reports across several pages and keywords
//!
//! ## Usage
//!
//! ```sh
//! areanews_crawler --api-key-file ./apikey.md -o ./crawler_results.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Targets**: CLI URLs, else the news API, else a built-in fallback list
//! 2. **Crawling**: one URL at a time with a fixed pause between fetches
//! 3. **Extraction**: classify source, pick body text, scrape title/metadata
//! 4. **Output**: summary logged, results written as a JSON array

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod crawler;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod sources;
mod summary;
mod utils;

use api::{AreaNewsClient, SurveySeries, content_availability, read_api_key, source_counts};
use cli::Cli;
use crawler::Crawler;
use outputs::json;
use summary::CrawlSummary;

/// One known article per recognized source, used when the API yields nothing.
const FALLBACK_URLS: &[&str] = &[
    "https://xapp.southcn.com/node_2ea31fe5fd/b150021036.shtml",
    "https://news.ycwb.com/ikinvjktjn/content_53731774.htm",
    "http://www.gd.chinanews.com.cn/2025/2025-03-02/440615.shtml",
];

/// How many listed articles `--inspect` probes.
const INSPECT_SAMPLE: usize = 3;
/// Characters of each sample description shown by `--inspect`.
const DESCRIPTION_PREVIEW: usize = 100;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("areanews_crawler starting up");

    let args = Cli::parse();
    debug!(
        urls = args.urls.len(),
        region = %args.region,
        output = %args.output.display(),
        inspect = args.inspect,
        "Parsed CLI arguments"
    );

    if args.inspect {
        return inspect(&args).await;
    }

    let targets = resolve_targets(&args).await;
    info!(count = targets.len(), "Crawl targets ready");

    let crawler = Crawler::from_config(&args.crawler_config())?;
    let results = crawler.crawl_all(&targets).await;

    let summary = CrawlSummary::from_results(&results);
    summary.log(&results);

    if let Err(e) = json::write_results(&results, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write results");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        output = %args.output.display(),
        successful = summary.successful,
        total = summary.total,
        "Execution complete"
    );
    Ok(())
}

/// Explicit URLs win; otherwise ask the API; otherwise use the fallback list.
#[instrument(level = "info", skip_all)]
async fn resolve_targets(args: &Cli) -> Vec<String> {
    if !args.urls.is_empty() {
        return args.urls.clone();
    }

    let harvested = match api_client(args) {
        Some(client) => match client.harvest_urls(args.keyword()).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!(error = %e, "Could not fetch URLs from the news API");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    if harvested.is_empty() {
        info!("Using fallback test URLs");
        FALLBACK_URLS.iter().map(|u| u.to_string()).collect()
    } else {
        harvested
    }
}

/// Build the API client from `--api-key` or the key file.
fn api_client(args: &Cli) -> Option<AreaNewsClient> {
    let key = match &args.api_key {
        Some(key) => key.trim().to_string(),
        None => match read_api_key(&args.api_key_file) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "API key not available");
                return None;
            }
        },
    };

    match AreaNewsClient::new(key, args.region.clone()) {
        Ok(client) => Some(client),
        Err(e) => {
            error!(error = %e, "Failed to build news API client");
            None
        }
    }
}

/// Summarize the API listing, probe a few article URLs, then survey sources.
#[instrument(level = "info", skip_all, fields(region = %args.region))]
async fn inspect(args: &Cli) -> Result<(), Box<dyn Error>> {
    let Some(client) = api_client(args) else {
        return Err("--inspect needs an API key (--api-key or --api-key-file)".into());
    };

    let articles = client.fetch_page(1, args.keyword()).await?;

    let counts = source_counts(&articles);
    info!(unique_sources = counts.len(), "Source analysis");
    for (source, count) in &counts {
        info!(%source, count, "Source");
    }

    let availability = content_availability(&articles);
    info!(
        total = availability.total,
        with_description = availability.with_description,
        with_picture = availability.with_picture,
        with_url = availability.with_url,
        "Content availability"
    );

    for article in articles.iter().take(INSPECT_SAMPLE) {
        let Some(url) = article.url.as_deref() else {
            continue;
        };
        let outcome = client.probe_url(url).await;
        info!(
            id = article.id.as_deref().unwrap_or(""),
            title = article.title.as_deref().unwrap_or("N/A"),
            source = article.source.as_deref().unwrap_or("N/A"),
            ctime = article.ctime.as_deref().unwrap_or("N/A"),
            description = %article.description_preview(DESCRIPTION_PREVIEW),
            has_image = article.has_image(),
            %url,
            reachable = outcome.is_reachable(),
            ?outcome,
            "Probed article URL"
        );
    }

    let survey = client.survey_sources(&SurveySeries::plan(args.keyword())).await;
    for series in &survey.series {
        info!(
            keyword = series.keyword.as_deref().unwrap_or("(none)"),
            pages = series.pages_scanned,
            sources = %series.sources.join(", "),
            "Survey series"
        );
    }
    info!(
        unique_sources = survey.unique_sources(),
        articles_scanned = survey.articles_scanned,
        "Source survey complete"
    );
    for (source, count) in &survey.counts {
        info!(%source, count, "Surveyed source");
    }
    Ok(())
}
