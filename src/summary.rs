//! End-of-run crawl statistics.

use crate::models::{ExtractionResult, SourceId};
use crate::utils::truncate_for_log;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Successes and attempts for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceTally {
    pub successful: usize,
    pub total: usize,
}

/// Aggregate view of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub total: usize,
    pub successful: usize,
    /// Characters extracted across successful results only.
    pub total_chars: usize,
    pub per_source: BTreeMap<SourceId, SourceTally>,
}

impl CrawlSummary {
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let mut summary = CrawlSummary {
            total: results.len(),
            ..Default::default()
        };
        for r in results {
            let tally = summary.per_source.entry(r.source).or_default();
            tally.total += 1;
            if r.success {
                tally.successful += 1;
                summary.successful += 1;
                summary.total_chars += r.content_length;
            }
        }
        summary
    }

    /// Log the totals, then one line per result.
    pub fn log(&self, results: &[ExtractionResult]) {
        info!(
            total = self.total,
            successful = self.successful,
            failed = self.total - self.successful,
            total_chars = self.total_chars,
            "Crawl summary"
        );
        for (source, tally) in &self.per_source {
            info!(%source, successful = tally.successful, total = tally.total, "Per-source results");
        }
        for (i, r) in results.iter().enumerate() {
            if r.success {
                info!(
                    index = i + 1,
                    source = %r.source,
                    url = %truncate_for_log(&r.url, 70),
                    title = %truncate_for_log(&r.title, 50),
                    content_length = r.content_length,
                    "OK"
                );
            } else {
                warn!(
                    index = i + 1,
                    source = %r.source,
                    url = %truncate_for_log(&r.url, 70),
                    error = r.error.as_deref().unwrap_or("unknown error"),
                    "FAILED"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(source: SourceId, success: bool, len: usize) -> ExtractionResult {
        let mut r = ExtractionResult::failed("http://x.test/", source, "e".into());
        r.success = success;
        r.content_length = len;
        if success {
            r.error = None;
        }
        r
    }

    #[test]
    fn test_summary_counts_only_successful_chars() {
        let results = vec![
            result(SourceId::Southcn, true, 1500),
            result(SourceId::Southcn, false, 40),
            result(SourceId::Chinanews, true, 800),
            result(SourceId::Unknown, false, 0),
        ];
        let s = CrawlSummary::from_results(&results);
        assert_eq!(s.total, 4);
        assert_eq!(s.successful, 2);
        assert_eq!(s.total_chars, 2300);
        assert_eq!(
            s.per_source[&SourceId::Southcn],
            SourceTally {
                successful: 1,
                total: 2
            }
        );
        assert!(!s.per_source.contains_key(&SourceId::Ycwb));
        s.log(&results);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(CrawlSummary::from_results(&[]), CrawlSummary::default());
    }
}
