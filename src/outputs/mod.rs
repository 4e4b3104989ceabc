//! Output sinks for crawl results.
//!
//! - [`json`]: writes the result list as one pretty-printed JSON array

pub mod json;
