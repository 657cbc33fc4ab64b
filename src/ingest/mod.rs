// Ingestion — pulling raw postings from a job source.
//
// The job source itself (scraper, file, API) is an external collaborator
// behind the JobSource trait. This module only owns the fetch discipline:
// pages are fetched with a fixed degree of parallelism, a failed page is
// logged and skipped without touching its siblings, and every record that
// cannot become a Posting is kept as a SkipReason in the report.

pub mod csv_source;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::postings::{Posting, RawPosting, SkipReason};

pub use csv_source::CsvJobSource;

/// Something that yields raw postings, one page at a time.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Number of pages to request (pages are numbered from 1).
    fn page_count(&self) -> u32;

    /// Fetch one page. May return zero postings.
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawPosting>>;
}

/// Outcome of one ingestion pass.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub postings: Vec<Posting>,
    pub skipped: Vec<SkipReason>,
    pub pages_ok: u32,
    pub pages_failed: u32,
}

impl IngestReport {
    /// Skip reasons for individual records (page failures excluded).
    pub fn record_skips(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s, SkipReason::MissingField(_)))
            .count()
    }
}

/// Split a batch of raw records into postings and skip reasons.
pub fn parse_records(raw: Vec<RawPosting>) -> (Vec<Posting>, Vec<SkipReason>) {
    let mut postings = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();
    for record in raw {
        match Posting::try_from(record) {
            Ok(posting) => postings.push(posting),
            Err(reason) => {
                warn!(%reason, "Dropping posting");
                skipped.push(reason);
            }
        }
    }
    (postings, skipped)
}

/// Fetch every page from `source` with at most `max_workers` in flight.
///
/// Page order in the result is unspecified. Only a `max_workers` of zero is
/// an error; individual page failures end up in the report.
pub async fn collect(source: &dyn JobSource, max_workers: usize) -> Result<IngestReport> {
    if max_workers == 0 {
        anyhow::bail!("ingestion needs at least one worker");
    }

    let pages = source.page_count();
    let pb = ProgressBar::new(u64::from(pages));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Pages [{bar:30}] {pos}/{len} ({eta})")
            .unwrap(),
    );

    let mut fetches = stream::iter((1..=pages).map(|page| async move {
        (page, source.fetch_page(page).await)
    }))
    .buffer_unordered(max_workers);

    let mut report = IngestReport::default();
    while let Some((page, result)) = fetches.next().await {
        match result {
            Ok(raw) => {
                let (postings, skipped) = parse_records(raw);
                info!(
                    page,
                    postings = postings.len(),
                    skipped = skipped.len(),
                    "Page ingested"
                );
                report.postings.extend(postings);
                report.skipped.extend(skipped);
                report.pages_ok += 1;
            }
            Err(e) => {
                warn!(page, error = %e, "Failed to fetch page, skipping");
                report.skipped.push(SkipReason::PageFailed {
                    page,
                    error: e.to_string(),
                });
                report.pages_failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(report)
}
