//! Known news sources and their content selectors.
//!
//! Classification looks only at the URL host. Each known source has a
//! [`SourceProfile`] listing, in priority order, the CSS selectors most likely
//! to wrap the article body on that site.
//!
//! | Source | Host contains | First choice |
//! |--------|---------------|--------------|
//! | 南方网 | `southcn` | `div.article-content` |
//! | 金羊网 | `ycwb.com` | `div.article-content` |
//! | 中国新闻网 | `chinanews.com.cn` | `div.left_zw` |

use crate::models::SourceId;
use url::Url;

/// Ordered host-substring table; first match wins.
const HOST_PATTERNS: &[(&str, SourceId)] = &[
    ("southcn", SourceId::Southcn),
    ("ycwb.com", SourceId::Ycwb),
    ("chinanews.com.cn", SourceId::Chinanews),
];

/// Per-source body selectors, tried in order.
#[derive(Debug, Clone, Copy)]
pub struct SourceProfile {
    pub source: SourceId,
    pub content_selectors: &'static [&'static str],
}

const SOUTHCN: SourceProfile = SourceProfile {
    source: SourceId::Southcn,
    content_selectors: &[
        "div.article-content",
        "div.content",
        "div.article-body",
        r#"div[class*="content"]"#,
        r#"div[class*="article"]"#,
        "article",
        "div.text",
    ],
};

const YCWB: SourceProfile = SourceProfile {
    source: SourceId::Ycwb,
    content_selectors: &[
        "div.article-content",
        "div.content",
        "div.article-body",
        r#"div[class*="content"]"#,
        r#"div[class*="article"]"#,
        "article",
        "div.text",
        "div.main-content",
    ],
};

const CHINANEWS: SourceProfile = SourceProfile {
    source: SourceId::Chinanews,
    content_selectors: &[
        "div.left_zw",
        "div.content",
        "div.article-content",
        r#"div[class*="content"]"#,
        r#"div[class*="article"]"#,
        "article",
        "div.text",
    ],
};

/// Every registered profile. `Unknown` has none.
pub const PROFILES: &[SourceProfile] = &[SOUTHCN, YCWB, CHINANEWS];

/// Map a URL to the news source it belongs to.
///
/// Unparseable URLs and URLs without a host classify as
/// [`SourceId::Unknown`].
pub fn identify_source(url: &str) -> SourceId {
    let Ok(parsed) = Url::parse(url) else {
        return SourceId::Unknown;
    };
    let Some(host) = parsed.host_str() else {
        return SourceId::Unknown;
    };
    let host = host.to_lowercase();

    HOST_PATTERNS
        .iter()
        .find(|(needle, _)| host.contains(needle))
        .map(|(_, source)| *source)
        .unwrap_or(SourceId::Unknown)
}
