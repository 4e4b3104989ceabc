//! Article extraction from parsed HTML.
//!
//! - [`content`]: the article body, through a swappable [`ContentStrategy`]
//! - [`metadata`]: title, author and publish date
//!
//! Nothing here mutates the document. Unwanted sub-elements (scripts, nav
//! bars, footers, ...) are skipped while walking the tree, so the same
//! [`Html`] can be handed to every extractor in any order.

pub mod content;
pub mod metadata;

use crate::models::SourceId;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub use content::SelectorStrategy;
pub use metadata::{extract_metadata, extract_title};

/// Which step of a strategy produced the returned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// A source-specific selector.
    Specific(&'static str),
    /// A broad content-region container.
    Generic(&'static str),
    /// No selector matched anything.
    Nothing,
}

/// Text chosen by a [`ContentStrategy`] plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMatch {
    pub text: String,
    pub tier: Tier,
}

impl ContentMatch {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            tier: Tier::Nothing,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A heuristic that picks the article body out of a document.
///
/// Implementations must not fail; an empty [`ContentMatch`] means nothing
/// usable was found.
pub trait ContentStrategy {
    fn extract(&self, document: &Html, source: SourceId) -> ContentMatch;
}

/// Parse a selector from one of the static tables, logging bad ones.
pub(crate) fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(%selector, error = %e, "Skipping invalid selector");
            None
        }
    }
}

/// Selectors compiled once, each kept next to its source text for reporting.
pub(crate) type SelectorTable = Vec<(&'static str, Selector)>;

/// Compile a static selector list, dropping entries that fail to parse.
pub(crate) fn compile_table(selectors: &[&'static str]) -> SelectorTable {
    selectors
        .iter()
        .filter_map(|&css| compile(css).map(|sel| (css, sel)))
        .collect()
}

/// Visible text below `root`, skipping subtrees rooted at any tag in `skip`.
///
/// Every text node is trimmed, empty ones are dropped and the rest are joined
/// with `separator`. `root` itself is never skipped.
pub(crate) fn visible_text(root: ElementRef<'_>, skip: &[&str], separator: &str) -> String {
    let mut parts = Vec::new();
    collect_text(root, skip, &mut parts);
    parts.join(separator)
}

fn collect_text<'a>(element: ElementRef<'a>, skip: &[&str], out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed);
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !skip.contains(&child_el.value().name()) {
                collect_text(child_el, skip, out);
            }
        }
    }
}
