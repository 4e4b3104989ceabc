//! Page fetching over HTTP.
//!
//! [`HttpFetcher`] sends one GET per URL with desktop-browser headers, follows
//! redirects and gives up after the configured timeout. There is no retry: a
//! failed attempt is final for that URL.
//!
//! Response bytes are decoded with the charset named in `Content-Type` when
//! the body is actually valid in it, otherwise with whatever `chardetng`
//! detects. Many of the regional sites still serve GBK, sometimes without
//! declaring it and sometimes labelled as UTF-8.

use crate::error::CrawlError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// Something that can turn a URL into page markup.
///
/// The crawler only depends on this trait, so tests can drive it with canned
/// pages or canned failures.
pub trait FetchPage {
    async fn fetch(&self, url: &str) -> Result<String, CrawlError>;
}

/// reqwest-backed [`FetchPage`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Fetch failed");
            CrawlError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Non-success HTTP status");
            return Err(CrawlError::Network(format!("HTTP status {status} for url ({url})")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            content_type = content_type.as_deref().unwrap_or(""),
            "Fetched page"
        );

        Ok(decode_body(&body, content_type.as_deref()))
    }
}

/// Decode a response body to text.
///
/// A charset label in `content_type` is used only when `encoding_rs` knows it
/// and the body decodes under it without replacement characters. Anything
/// else (no label, unknown label, or a page mislabelled as UTF-8 while
/// actually GBK) goes through `chardetng`, which lands on UTF-8 for plain
/// ASCII and valid UTF-8 input.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(extract_charset)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()));

    if let Some(encoding) = declared {
        let (decoded, used, had_errors) = encoding.decode(body);
        if !had_errors {
            return decoded.into_owned();
        }
        debug!(declared = used.name(), "Body is not valid in the declared charset; detecting");
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    debug!(detected = encoding.name(), "Detected body charset");
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Pull the `charset=` parameter out of a Content-Type value.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .map(|cs| cs.trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|cs| !cs.is_empty())
}
