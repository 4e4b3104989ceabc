//! Data models for crawl targets, extraction results and the news API.
//!
//! - [`SourceId`]: which known news site a URL belongs to
//! - [`ExtractionResult`]: one record per crawled URL, written to the output sink
//! - [`ApiArticle`] / [`ApiEnvelope`]: wire shapes of the regional news API

use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognized news domain, or `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// 南方网
    Southcn,
    /// 金羊网
    Ycwb,
    /// 中国新闻网
    Chinanews,
    Unknown,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Southcn => "southcn",
            SourceId::Ycwb => "ycwb",
            SourceId::Chinanews => "chinanews",
            SourceId::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort byline data scraped next to the article body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub author: String,
    pub publish_date: String,
    pub source_url: String,
}

/// The outcome of crawling a single article URL.
///
/// `success` is true iff `content` holds more than
/// [`MIN_SUCCESS_CHARS`](crate::crawler::MIN_SUCCESS_CHARS) characters;
/// otherwise `error` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub url: String,
    pub success: bool,
    pub source: SourceId,
    pub title: String,
    pub content: String,
    /// Length of `content` in characters.
    pub content_length: usize,
    pub metadata: Metadata,
    pub error: Option<String>,
}

impl ExtractionResult {
    /// A failed result that never reached extraction.
    pub fn failed(url: &str, source: SourceId, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            source,
            title: String::new(),
            content: String::new(),
            content_length: 0,
            metadata: Metadata {
                source_url: url.to_string(),
                ..Metadata::default()
            },
            error: Some(error),
        }
    }
}

/// One article record as returned by the regional news API.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiArticle {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Creation time as formatted by the API, e.g. `2025-03-02 10:21`.
    #[serde(default)]
    pub ctime: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub picUrl: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ApiArticle {
    /// The description cut to `max` characters, or `(empty)` when missing.
    pub fn description_preview(&self, max: usize) -> String {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| truncate_for_log(d, max))
            .unwrap_or_else(|| "(empty)".to_string())
    }

    pub fn has_image(&self) -> bool {
        self.picUrl.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// The `result` payload is either a bare list or an object wrapping one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResult {
    List(Vec<ApiArticle>),
    Wrapped {
        #[serde(default)]
        list: Vec<ApiArticle>,
    },
}

impl ApiResult {
    pub fn into_articles(self) -> Vec<ApiArticle> {
        match self {
            ApiResult::List(list) | ApiResult::Wrapped { list } => list,
        }
    }
}

/// Response envelope of the regional news API.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub result: Option<ApiResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SourceId::Chinanews).unwrap(), "\"chinanews\"");
        assert_eq!(serde_json::to_string(&SourceId::Unknown).unwrap(), "\"unknown\"");
        assert_eq!(SourceId::Southcn.to_string(), "southcn");
    }

    #[test]
    fn test_failed_result_shape() {
        let r = ExtractionResult::failed(
            "https://news.ycwb.com/a.htm",
            SourceId::Ycwb,
            "Request timeout".into(),
        );
        assert!(!r.success);
        assert_eq!(r.content_length, 0);
        assert_eq!(r.metadata.source_url, "https://news.ycwb.com/a.htm");
        assert_eq!(r.error.as_deref(), Some("Request timeout"));
    }

    #[test]
    fn test_extraction_result_json_fields() {
        let r = ExtractionResult::failed("http://x.test/", SourceId::Unknown, "boom".into());
        let v: serde_json::Value = serde_json::to_value(&r).unwrap();
        for key in [
            "url",
            "success",
            "source",
            "title",
            "content",
            "content_length",
            "metadata",
            "error",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["metadata"]["publish_date"], "");
    }

    #[test]
    fn test_envelope_with_wrapped_list() {
        let json = r#"{
            "code": 200,
            "msg": "success",
            "result": {"curpage": 1, "allnum": 1, "list": [
                {"id": "abc", "title": "广州新闻", "source": "南方网", "ctime": "2025-03-02 10:00",
                 "description": "", "picUrl": "", "url": "https://xapp.southcn.com/a.shtml"}
            ]}
        }"#;
        let env: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.code, 200);
        let articles = env.result.unwrap().into_articles();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source.as_deref(), Some("南方网"));
    }

    #[test]
    fn test_envelope_with_bare_list() {
        let json = r#"{"code": 200, "msg": "success", "result": [{"url": "http://a.test/1"}]}"#;
        let env: ApiEnvelope = serde_json::from_str(json).unwrap();
        let articles = env.result.unwrap().into_articles();
        assert_eq!(articles[0].url.as_deref(), Some("http://a.test/1"));
        assert!(articles[0].title.is_none());
    }

    #[test]
    fn test_envelope_error_without_result() {
        let json = r#"{"code": 150, "msg": "API可用次数不足"}"#;
        let env: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.code, 150);
        assert!(env.result.is_none());
    }

    #[test]
    fn test_article_preview_fields() {
        let article = ApiArticle {
            description: Some("展".repeat(120)),
            picUrl: Some("https://img.test/1.jpg".into()),
            ..ApiArticle::default()
        };
        assert_eq!(
            article.description_preview(100),
            format!("{}…(+20 chars)", "展".repeat(100))
        );
        assert!(article.has_image());

        let bare = ApiArticle {
            description: Some(String::new()),
            picUrl: Some(String::new()),
            ..ApiArticle::default()
        };
        assert_eq!(bare.description_preview(100), "(empty)");
        assert!(!bare.has_image());
    }
}
