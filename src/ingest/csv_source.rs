// CSV job source — postings already scraped to disk (e.g. daily_jobs.csv).
//
// The whole file is one page. Columns follow the posting table layout; a
// Predicted_Cluster column, if present, is ignored.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::JobSource;
use crate::postings::{table, RawPosting};

pub struct CsvJobSource {
    path: PathBuf,
}

impl CsvJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl JobSource for CsvJobSource {
    fn page_count(&self) -> u32 {
        1
    }

    async fn fetch_page(&self, _page: u32) -> Result<Vec<RawPosting>> {
        let path = self.path.clone();
        let records = tokio::task::spawn_blocking(move || table::read_raw(&path))
            .await
            .context("CSV reader task panicked")?
            .with_context(|| format!("Failed to read postings from {}", self.path.display()))?;
        Ok(records)
    }
}
