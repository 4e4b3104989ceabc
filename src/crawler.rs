//! Per-URL crawl orchestration.
//!
//! [`Crawler::crawl_article`] runs fetch → parse → classify → extract for one
//! URL and always returns an [`ExtractionResult`]; failures are recorded in the
//! result rather than propagated. [`Crawler::crawl_all`] walks a list strictly
//! in order with a fixed pause between fetches.

use crate::error::CrawlError;
use crate::extract::{ContentStrategy, SelectorStrategy, extract_metadata, extract_title};
use crate::fetch::{FetchPage, HttpFetcher};
use crate::models::ExtractionResult;
use crate::sources::identify_source;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Extracted content must be longer than this for a crawl to succeed.
pub const MIN_SUCCESS_CHARS: usize = 100;

/// Knobs for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Upper bound on a single page fetch.
    pub timeout: Duration,
    /// Pause between successive fetches.
    pub delay: Duration,
}

/// Sequential article crawler.
#[derive(Debug)]
pub struct Crawler<F, S = SelectorStrategy> {
    fetcher: F,
    strategy: S,
    delay: Duration,
}

impl Crawler<HttpFetcher, SelectorStrategy> {
    /// HTTP crawler with the default selector strategy.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        Ok(Self::new(
            HttpFetcher::new(config.timeout)?,
            SelectorStrategy::default(),
            config.delay,
        ))
    }
}

impl<F, S> Crawler<F, S>
where
    F: FetchPage,
    S: ContentStrategy,
{
    pub fn new(fetcher: F, strategy: S, delay: Duration) -> Self {
        Self {
            fetcher,
            strategy,
            delay,
        }
    }

    /// Crawl one URL into a result record.
    #[instrument(level = "info", skip(self))]
    pub async fn crawl_article(&self, url: &str) -> ExtractionResult {
        let source = identify_source(url);
        info!(%source, "Crawling article");

        let markup = match self.fetcher.fetch(url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(%source, error = %e, "Fetch failed; skipping extraction");
                return ExtractionResult::failed(url, source, e.to_string());
            }
        };

        let document = match parse_markup(&markup) {
            Ok(document) => document,
            Err(e) => {
                warn!(%source, error = %e, "Parse failed; skipping extraction");
                return ExtractionResult::failed(url, source, e.to_string());
            }
        };

        let title = extract_title(&document);
        let found = self.strategy.extract(&document, source);
        let metadata = extract_metadata(&document, url);
        let content_length = found.char_len();
        debug!(tier = ?found.tier, content_length, "Content extracted");

        let success = !found.text.is_empty() && content_length > MIN_SUCCESS_CHARS;
        let error = if success {
            info!(content_length, title = %truncate_for_log(&title, 60), "Extracted article");
            None
        } else {
            let e = CrawlError::ContentTooShort(content_length);
            warn!(error = %e, "Extraction failed");
            Some(e.to_string())
        };

        ExtractionResult {
            url: url.to_string(),
            success,
            source,
            title,
            content: found.text,
            content_length,
            metadata,
            error,
        }
    }

    /// Crawl every URL in order, pausing between fetches.
    ///
    /// A failed URL never stops the batch; the output has one result per
    /// input URL, in input order.
    #[instrument(level = "info", skip_all, fields(count = urls.len()))]
    pub async fn crawl_all(&self, urls: &[String]) -> Vec<ExtractionResult> {
        let total = urls.len();
        stream::iter(urls.iter().enumerate())
            .then(|(i, url)| async move {
                if i > 0 && !self.delay.is_zero() {
                    sleep(self.delay).await;
                }
                info!(index = i + 1, total, %url, "Processing URL");
                self.crawl_article(url).await
            })
            .collect()
            .await
    }
}

/// Build a document from fetched markup.
///
/// The HTML parser recovers from any malformed markup, including an empty
/// body. The one input rejected is text carrying NUL characters, which only
/// shows up when a binary resource was served in place of a page.
pub fn parse_markup(markup: &str) -> Result<Html, CrawlError> {
    if let Some(offset) = markup.find('\0') {
        return Err(CrawlError::Parse(format!(
            "unexpected NUL character at byte {offset}; body is not markup"
        )));
    }
    Ok(Html::parse_document(markup))
}
