//! Client for the regional news API that supplies crawl targets.
//!
//! The API is a single query-string endpoint:
//!
//! ```text
//! GET https://apis.tianapi.com/areanews/index?key=KEY&areaname=广东&page=1[&word=展览]
//! ```
//!
//! and answers with `{ "code": 200, "msg": "success", "result": ... }`, where
//! `result` is either a list of articles or `{ "list": [...] }`. Only the
//! `url` field of each article feeds the crawler; the rest is used for the
//! source/content analysis behind `--inspect`.

use crate::error::ApiError;
use crate::models::{ApiArticle, ApiEnvelope};
use itertools::Itertools;
use reqwest::redirect::Policy;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_ENDPOINT: &str = "https://apis.tianapi.com/areanews/index";

const API_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// URLs taken from the plain listing before the keyword search tops up.
const PLAIN_HARVEST_LIMIT: usize = 5;
/// Overall cap on harvested URLs.
const HARVEST_LIMIT: usize = 8;
/// Listing pages scanned per series in a source survey.
const SURVEY_PAGES: u32 = 5;
/// Listing pages scanned for each extra survey keyword.
const SURVEY_EXTRA_PAGES: u32 = 2;
/// Topics searched by the survey to reach sources the main listing misses.
pub const SURVEY_EXTRA_KEYWORDS: &[&str] = &["旅游", "经济", "科技", "教育"];

/// Read the API key from a plaintext file, trimming surrounding whitespace.
pub fn read_api_key(path: &Path) -> Result<String, ApiError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| ApiError::KeyFile {
            path: path.display().to_string(),
            source,
        })
}

/// Regional news API client. The key is passed in explicitly.
#[derive(Debug, Clone)]
pub struct AreaNewsClient {
    http: reqwest::Client,
    probe: reqwest::Client,
    endpoint: String,
    api_key: String,
    region: String,
}

impl AreaNewsClient {
    pub fn new(api_key: impl Into<String>, region: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, region)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
        let probe = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(Policy::limited(10))
            .build()?;
        Ok(Self {
            http,
            probe,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            region: region.into(),
        })
    }

    /// Fetch one page of articles, optionally filtered by keyword.
    #[instrument(level = "info", skip(self), fields(region = %self.region))]
    pub async fn fetch_page(&self, page: u32, keyword: Option<&str>) -> Result<Vec<ApiArticle>, ApiError> {
        let page = page.to_string();
        let mut params = vec![
            ("key", self.api_key.as_str()),
            ("areaname", self.region.as_str()),
            ("page", page.as_str()),
        ];
        if let Some(word) = keyword {
            params.push(("word", word));
        }

        let envelope: ApiEnvelope = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.code != 200 {
            warn!(code = envelope.code, msg = %envelope.msg, "API returned an error");
            return Err(ApiError::Api {
                code: envelope.code,
                msg: envelope.msg,
            });
        }

        let articles = envelope.result.map(|r| r.into_articles()).unwrap_or_default();
        info!(count = articles.len(), "Fetched article listing");
        Ok(articles)
    }

    /// Collect crawl targets, at most one URL per reporting source.
    ///
    /// Up to five come from the first unfiltered page; the keyword search then
    /// tops the list up to eight. If the keyword search fails, the URLs already
    /// collected are returned.
    #[instrument(level = "info", skip(self))]
    pub async fn harvest_urls(&self, keyword: Option<&str>) -> Result<Vec<String>, ApiError> {
        let plain = self.fetch_page(1, None).await?;
        let mut picked = pick_distinct_sources(Vec::new(), &plain, PLAIN_HARVEST_LIMIT);

        if let Some(word) = keyword {
            match self.fetch_page(1, Some(word)).await {
                Ok(extra) => picked = pick_distinct_sources(picked, &extra, HARVEST_LIMIT),
                Err(e) => warn!(keyword = %word, error = %e, "Keyword search failed; keeping plain results"),
            }
        }

        debug!(urls = ?picked, "Harvested URLs");
        Ok(picked.into_iter().map(|(url, _)| url).collect())
    }

    /// Check whether `url` answers a HEAD request.
    #[instrument(level = "debug", skip(self))]
    pub async fn probe_url(&self, url: &str) -> ProbeOutcome {
        match self.probe.head(url).send().await {
            Ok(resp) if resp.status().is_success() => ProbeOutcome::Reachable {
                status: resp.status().as_u16(),
                content_type: resp
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("Unknown")
                    .to_string(),
            },
            Ok(resp) => ProbeOutcome::Unreachable {
                status: resp.status().as_u16(),
            },
            Err(e) => ProbeOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Walk each series of listing pages and merge the sources they report.
    ///
    /// A series stops at its first failed page; later series still run. Every
    /// article counts once toward its source, so an outlet showing up in two
    /// searches is counted twice.
    #[instrument(level = "info", skip_all, fields(series = plan.len()))]
    pub async fn survey_sources(&self, plan: &[SurveySeries]) -> SourceSurvey {
        let mut all_names = Vec::new();
        let mut reports = Vec::with_capacity(plan.len());
        let mut articles_scanned = 0;

        for series in plan {
            let keyword = series.keyword.as_deref();
            let mut names = Vec::new();
            let mut pages_scanned = 0;
            for page in 1..=series.pages {
                match self.fetch_page(page, keyword).await {
                    Ok(articles) => {
                        articles_scanned += articles.len();
                        names.extend(articles.iter().map(source_name));
                        pages_scanned += 1;
                    }
                    Err(e) => {
                        warn!(keyword = keyword.unwrap_or(""), page, error = %e, "Survey series stopped");
                        break;
                    }
                }
            }

            let sources: Vec<String> = names.iter().cloned().sorted().dedup().collect();
            info!(
                keyword = keyword.unwrap_or(""),
                pages_scanned,
                unique_sources = sources.len(),
                "Survey series done"
            );
            all_names.extend(names);
            reports.push(SeriesReport {
                keyword: series.keyword.clone(),
                pages_scanned,
                sources,
            });
        }

        SourceSurvey {
            series: reports,
            counts: rank_counts(all_names),
            articles_scanned,
        }
    }
}

/// Result of a HEAD probe against an article URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable { status: u16, content_type: String },
    /// The server answered with a non-success status.
    Unreachable { status: u16 },
    /// No HTTP answer at all (DNS, connect, timeout, ...).
    Failed { reason: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }
}

/// A run of consecutive listing pages, optionally filtered by keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveySeries {
    pub keyword: Option<String>,
    pub pages: u32,
}

impl SurveySeries {
    /// The unfiltered listing and `keyword` for five pages each, then two
    /// pages for each of [`SURVEY_EXTRA_KEYWORDS`].
    pub fn plan(keyword: Option<&str>) -> Vec<Self> {
        std::iter::once(None)
            .chain(keyword.map(Some))
            .map(|kw| SurveySeries {
                keyword: kw.map(str::to_string),
                pages: SURVEY_PAGES,
            })
            .chain(SURVEY_EXTRA_KEYWORDS.iter().map(|kw| SurveySeries {
                keyword: Some(kw.to_string()),
                pages: SURVEY_EXTRA_PAGES,
            }))
            .collect()
    }
}

/// What one survey series found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesReport {
    pub keyword: Option<String>,
    /// Pages answered successfully before the series ended.
    pub pages_scanned: u32,
    /// Distinct source names, sorted.
    pub sources: Vec<String>,
}

/// Merged result of [`AreaNewsClient::survey_sources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSurvey {
    pub series: Vec<SeriesReport>,
    /// Article counts per source across every series, most common first.
    pub counts: Vec<(String, usize)>,
    pub articles_scanned: usize,
}

impl SourceSurvey {
    pub fn unique_sources(&self) -> usize {
        self.counts.len()
    }
}

/// Extend `picked` with `(url, source)` pairs whose source is not yet present,
/// stopping at `limit` entries. Articles without a URL are skipped.
fn pick_distinct_sources(
    mut picked: Vec<(String, String)>,
    articles: &[ApiArticle],
    limit: usize,
) -> Vec<(String, String)> {
    let fresh = articles
        .iter()
        .filter_map(|a| {
            let url = a.url.as_deref().filter(|u| !u.is_empty())?;
            Some((url.to_string(), a.source.clone().unwrap_or_default()))
        })
        .filter(|(_, source)| !picked.iter().any(|(_, seen)| seen == source))
        .unique_by(|(_, source)| source.clone())
        .collect::<Vec<_>>();

    let room = limit.saturating_sub(picked.len());
    picked.extend(fresh.into_iter().take(room));
    picked
}

/// Article counts per reporting source, most common first.
///
/// Ties keep alphabetical order. Articles without a source count as `Unknown`.
pub fn source_counts(articles: &[ApiArticle]) -> Vec<(String, usize)> {
    rank_counts(articles.iter().map(source_name))
}

fn source_name(article: &ApiArticle) -> String {
    article.source.clone().unwrap_or_else(|| "Unknown".to_string())
}

fn rank_counts(names: impl IntoIterator<Item = String>) -> Vec<(String, usize)> {
    names
        .into_iter()
        .counts()
        .into_iter()
        .sorted_by(|(a_src, a_n), (b_src, b_n)| b_n.cmp(a_n).then_with(|| a_src.cmp(b_src)))
        .collect()
}

/// How many listed articles carry each optional field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentAvailability {
    pub total: usize,
    pub with_description: usize,
    pub with_picture: usize,
    pub with_url: usize,
}

pub fn content_availability(articles: &[ApiArticle]) -> ContentAvailability {
    let present = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.is_empty());
    ContentAvailability {
        total: articles.len(),
        with_description: articles.iter().filter(|a| present(&a.description)).count(),
        with_picture: articles.iter().filter(|a| a.has_image()).count(),
        with_url: articles.iter().filter(|a| present(&a.url)).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn article(url: &str, source: &str) -> ApiArticle {
        ApiArticle {
            url: Some(url.into()),
            source: Some(source.into()),
            ..ApiArticle::default()
        }
    }

    #[test]
    fn test_pick_distinct_sources_respects_limit_and_uniqueness() {
        let listing = vec![
            article("u1", "南方网"),
            article("u2", "南方网"),
            article("u3", "金羊网"),
            ApiArticle {
                source: Some("无链接".into()),
                ..ApiArticle::default()
            },
            article("u4", "中国新闻网"),
        ];
        let picked = pick_distinct_sources(Vec::new(), &listing, 2);
        assert_eq!(
            picked,
            vec![
                ("u1".to_string(), "南方网".to_string()),
                ("u3".to_string(), "金羊网".to_string()),
            ]
        );

        let more = vec![article("u5", "金羊网"), article("u6", "广州日报")];
        let picked = pick_distinct_sources(picked, &more, 8);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[2].0, "u6");
    }

    #[test]
    fn test_source_counts_most_common_first() {
        let listing = vec![
            article("a", "金羊网"),
            article("b", "南方网"),
            article("c", "南方网"),
            ApiArticle::default(),
        ];
        let counts = source_counts(&listing);
        assert_eq!(counts[0], ("南方网".to_string(), 2));
        assert!(counts.contains(&("Unknown".to_string(), 1)));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_content_availability() {
        let listing = vec![
            ApiArticle {
                description: Some("摘要".into()),
                picUrl: Some("".into()),
                url: Some("http://a".into()),
                ..ApiArticle::default()
            },
            ApiArticle::default(),
        ];
        assert_eq!(
            content_availability(&listing),
            ContentAvailability {
                total: 2,
                with_description: 1,
                with_picture: 0,
                with_url: 1,
            }
        );
    }

    #[test]
    fn test_read_api_key_trims() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("apikey.md");
        std::fs::write(&path, "  abc123\n").unwrap();
        assert_eq!(read_api_key(&path).unwrap(), "abc123");
        assert!(matches!(
            read_api_key(&tmp.path().join("missing.md")),
            Err(ApiError::KeyFile { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_query_and_unwraps_list() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/areanews/index")
                    .query_param("key", "k")
                    .query_param("areaname", "广东")
                    .query_param("page", "2")
                    .query_param("word", "展览");
                then.status(200).json_body(json!({
                    "code": 200,
                    "msg": "success",
                    "result": {"list": [{"url": "https://xapp.southcn.com/1.shtml", "source": "南方网"}]}
                }));
            })
            .await;

        let client = AreaNewsClient::with_endpoint(server.url("/areanews/index"), "k", "广东").unwrap();
        let articles = client.fetch_page(2, Some("展览")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source.as_deref(), Some("南方网"));
    }

    #[tokio::test]
    async fn test_fetch_page_api_error_code() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/areanews/index");
                then.status(200)
                    .json_body(json!({"code": 230, "msg": "key错误或为空"}));
            })
            .await;

        let client = AreaNewsClient::with_endpoint(server.url("/areanews/index"), "", "广东").unwrap();
        match client.fetch_page(1, None).await {
            Err(ApiError::Api { code, msg }) => {
                assert_eq!(code, 230);
                assert_eq!(msg, "key错误或为空");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_harvest_urls_tops_up_from_keyword_search() {
        let server = MockServer::start_async().await;
        let plain: Vec<_> = (0..7)
            .map(|i| json!({"url": format!("https://p/{i}"), "source": format!("源{i}")}))
            .collect();
        let keyword: Vec<_> = (0..7)
            .map(|i| json!({"url": format!("https://k/{i}"), "source": format!("源{}", i + 3)}))
            .collect();

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api").query_param("word", "展览");
                then.status(200)
                    .json_body(json!({"code": 200, "msg": "success", "result": keyword.clone()}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api").query_param_missing("word");
                then.status(200)
                    .json_body(json!({"code": 200, "msg": "success", "result": plain.clone()}));
            })
            .await;

        let client = AreaNewsClient::with_endpoint(server.url("/api"), "k", "广东").unwrap();
        let urls = client.harvest_urls(Some("展览")).await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://p/0",
                "https://p/1",
                "https://p/2",
                "https://p/3",
                "https://p/4",
                // 源3 and 源4 are already taken by the plain listing
                "https://k/2",
                "https://k/3",
                "https://k/4",
            ]
        );
    }

    #[test]
    fn test_survey_plan() {
        let plan = SurveySeries::plan(Some("展览"));
        let shape: Vec<_> = plan.iter().map(|s| (s.keyword.as_deref(), s.pages)).collect();
        assert_eq!(
            shape,
            vec![
                (None, 5),
                (Some("展览"), 5),
                (Some("旅游"), 2),
                (Some("经济"), 2),
                (Some("科技"), 2),
                (Some("教育"), 2),
            ]
        );
        assert_eq!(SurveySeries::plan(None).len(), 5);
    }

    /// Serve one listing page for `word` (or for the unfiltered listing).
    async fn listing<'a>(
        server: &'a MockServer,
        word: Option<&str>,
        page: &str,
        body: serde_json::Value,
    ) -> httpmock::Mock<'a> {
        server
            .mock_async(|when, then| {
                let when = when.method(GET).path("/api").query_param("page", page);
                match word {
                    Some(w) => when.query_param("word", w),
                    None => when.query_param_missing("word"),
                };
                then.status(200).json_body(body);
            })
            .await
    }

    #[tokio::test]
    async fn test_survey_stops_series_at_first_failure_and_merges_counts() {
        let server = MockServer::start_async().await;
        let ok = |list: serde_json::Value| json!({"code": 200, "msg": "success", "result": list});

        listing(
            &server,
            None,
            "1",
            ok(json!([
                {"url": "https://a/1", "source": "南方网"},
                {"url": "https://a/2", "source": "金羊网"}
            ])),
        )
        .await;
        listing(&server, None, "2", ok(json!([{"url": "https://a/3", "source": "南方网"}]))).await;
        listing(&server, None, "3", json!({"code": 250, "msg": "数据返回为空"})).await;
        let never = listing(&server, None, "4", ok(json!([{"source": "不应出现"}]))).await;
        listing(
            &server,
            Some("旅游"),
            "1",
            ok(json!([{"source": "广州日报"}, {"url": "https://k/1"}])),
        )
        .await;
        listing(&server, Some("旅游"), "2", ok(json!([{"source": "广州日报"}]))).await;

        let client = AreaNewsClient::with_endpoint(server.url("/api"), "k", "广东").unwrap();
        let plan = vec![
            SurveySeries {
                keyword: None,
                pages: 5,
            },
            SurveySeries {
                keyword: Some("旅游".into()),
                pages: 2,
            },
        ];
        let survey = client.survey_sources(&plan).await;

        never.assert_calls_async(0).await;
        assert_eq!(
            survey.series,
            vec![
                SeriesReport {
                    keyword: None,
                    pages_scanned: 2,
                    sources: vec!["南方网".into(), "金羊网".into()],
                },
                SeriesReport {
                    keyword: Some("旅游".into()),
                    pages_scanned: 2,
                    sources: vec!["Unknown".into(), "广州日报".into()],
                },
            ]
        );
        assert_eq!(
            survey.counts,
            vec![
                ("南方网".to_string(), 2),
                ("广州日报".to_string(), 2),
                ("Unknown".to_string(), 1),
                ("金羊网".to_string(), 1),
            ]
        );
        assert_eq!(survey.unique_sources(), 4);
        assert_eq!(survey.articles_scanned, 6);
    }

    #[tokio::test]
    async fn test_probe_url_outcomes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::HEAD).path("/ok");
                then.status(200).header("content-type", "text/html");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(Method::HEAD).path("/missing");
                then.status(404);
            })
            .await;

        let client = AreaNewsClient::with_endpoint(server.url("/api"), "k", "广东").unwrap();
        assert_eq!(
            client.probe_url(&server.url("/ok")).await,
            ProbeOutcome::Reachable {
                status: 200,
                content_type: "text/html".into(),
            }
        );
        assert_eq!(
            client.probe_url(&server.url("/missing")).await,
            ProbeOutcome::Unreachable { status: 404 }
        );
        assert!(matches!(
            client.probe_url("http://127.0.0.1:1/").await,
            ProbeOutcome::Failed { .. }
        ));
    }
}
