//! JSON output for crawl results.
//!
//! The whole batch is written as a single array, indented for reading, with
//! Chinese text left as-is rather than `\u` escaped.

use crate::models::ExtractionResult;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Render results as a pretty-printed JSON array.
pub fn render_results(results: &[ExtractionResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

/// Write results to `path`, creating its parent directory if needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = results.len()))]
pub async fn write_results(results: &[ExtractionResult], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = render_results(results)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(parent).await {
            error!(dir = %parent.display(), error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    fs::write(path, json).await?;
    info!("Wrote crawl results");
    Ok(())
}
