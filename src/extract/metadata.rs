//! Title, author and publish-date extraction.
//!
//! Each field has its own ordered selector list. The strings are returned as
//! scraped; no date parsing or author normalization happens here.

use super::{compile, visible_text};
use crate::models::Metadata;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// A title must be longer than this to be accepted.
const MIN_TITLE_CHARS: usize = 5;

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_all(&[
        "h1",
        "title",
        "h1.article-title",
        "div.title",
        r#"h1[class*="title"]"#,
    ])
});

static AUTHOR_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_all(&[
        "span.author",
        "div.author",
        "p.author",
        r#"[class*="author"]"#,
        r#"[class*="byline"]"#,
    ])
});

static DATE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_all(&[
        "span.date",
        "div.date",
        "p.date",
        "time",
        r#"[class*="date"]"#,
        r#"[class*="time"]"#,
    ])
});

fn compile_all(selectors: &[&str]) -> Vec<Selector> {
    selectors.iter().filter_map(|s| compile(s)).collect()
}

/// Stripped text of the first element matched by the first selector that
/// matches anything.
fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|sel| document.select(sel).next())
        .map(|el| visible_text(el, &[], ""))
}

/// Find the article headline.
///
/// Selectors are tried in order and the first match of each is inspected;
/// the first text longer than five characters wins. Returns an empty string
/// when nothing qualifies.
pub fn extract_title(document: &Html) -> String {
    TITLE_SELECTORS
        .iter()
        .filter_map(|sel| document.select(sel).next())
        .map(|el| visible_text(el, &[], ""))
        .find(|title| title.chars().count() > MIN_TITLE_CHARS)
        .unwrap_or_default()
}

/// Best-effort author and publish date.
pub fn extract_metadata(document: &Html, url: &str) -> Metadata {
    Metadata {
        author: first_text(document, &AUTHOR_SELECTORS).unwrap_or_default(),
        publish_date: first_text(document, &DATE_SELECTORS).unwrap_or_default(),
        source_url: url.to_string(),
    }
}
