//! Error types for crawling and for the upstream news API.
//!
//! Crawl errors never abort a batch: each one is rendered with `Display` and
//! stored in the `error` field of the affected [`ExtractionResult`].
//!
//! [`ExtractionResult`]: crate::models::ExtractionResult

use thiserror::Error;

/// Terminal failure for a single article URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrawlError {
    /// The request did not complete within the client timeout.
    #[error("Request timeout")]
    Timeout,
    /// Connection, redirect or HTTP status failure.
    #[error("Request error: {0}")]
    Network(String),
    /// The response body could not be turned into a document.
    #[error("HTML parsing error: {0}")]
    Parse(String),
    /// Extraction produced too little text to count as an article.
    #[error("Extracted content too short ({0} chars)")]
    ContentTooShort(usize),
}

impl From<reqwest::Error> for CrawlError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CrawlError::Timeout
        } else {
            CrawlError::Network(e.to_string())
        }
    }
}

/// Failure talking to the regional news API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The envelope came back with a non-200 `code`.
    #[error("API returned code {code}: {msg}")]
    Api { code: i64, msg: String },
    #[error("could not read API key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
