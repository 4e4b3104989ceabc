//! Source-aware body extraction with a generic fallback.
//!
//! [`SelectorStrategy`] walks the source's selector list and accepts the first
//! candidate whose text reaches `min_specific_chars`. A one-line caption under
//! an early selector therefore loses to the full body under a later one. When
//! no candidate is long enough, the first broad container (`main`, `article`,
//! `div#content`) wins whatever its length.

use super::{ContentMatch, ContentStrategy, SelectorTable, Tier, compile_table, visible_text};
use crate::models::SourceId;
use crate::sources::PROFILES;
use once_cell::sync::Lazy;
use scraper::Html;
use std::collections::HashMap;
use tracing::debug;

/// Minimum characters for a source-specific candidate to be accepted.
pub const MIN_SPECIFIC_CHARS: usize = 200;

/// Tags dropped from a source-specific candidate.
const SPECIFIC_NOISE: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Tags dropped from a generic container.
const GENERIC_NOISE: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

/// Broad content regions, in priority order.
const GENERIC_CONTAINERS: &[&str] = &["main", "article", "div#content"];

static SPECIFIC_TABLES: Lazy<HashMap<SourceId, SelectorTable>> = Lazy::new(|| {
    PROFILES
        .iter()
        .map(|p| (p.source, compile_table(p.content_selectors)))
        .collect()
});

static GENERIC_TABLE: Lazy<SelectorTable> = Lazy::new(|| compile_table(GENERIC_CONTAINERS));

/// Per-source selector table first, generic containers second.
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    pub min_specific_chars: usize,
}

impl Default for SelectorStrategy {
    fn default() -> Self {
        Self {
            min_specific_chars: MIN_SPECIFIC_CHARS,
        }
    }
}

impl SelectorStrategy {
    fn generic(&self, document: &Html) -> Option<ContentMatch> {
        GENERIC_TABLE.iter().find_map(|(css, sel)| {
            document.select(sel).next().map(|el| ContentMatch {
                text: visible_text(el, GENERIC_NOISE, "\n"),
                tier: Tier::Generic(*css),
            })
        })
    }
}

impl ContentStrategy for SelectorStrategy {
    fn extract(&self, document: &Html, source: SourceId) -> ContentMatch {
        let mut last = ContentMatch::empty();

        let specific = SPECIFIC_TABLES.get(&source).map(Vec::as_slice).unwrap_or_default();
        for (css, sel) in specific {
            let Some(el) = document.select(sel).next() else {
                continue;
            };
            last = ContentMatch {
                text: visible_text(el, SPECIFIC_NOISE, "\n"),
                tier: Tier::Specific(*css),
            };
            let chars = last.char_len();
            debug!(%source, selector = %css, chars, "Candidate selector matched");
            if chars >= self.min_specific_chars {
                return last;
            }
        }

        match self.generic(document) {
            Some(found) => {
                debug!(%source, tier = ?found.tier, chars = found.char_len(), "Using generic container");
                found
            }
            None => last,
        }
    }
}
