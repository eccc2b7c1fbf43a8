// src/scrape.rs

use anyhow::Result;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::extract;
use crate::history::History;
use crate::output::CsvSink;
use crate::report::{ReportRecord, ReportRef};

/// Outcome of a full run: the completed records plus the per-kind tallies of
/// everything that was not written.
#[derive(Debug, Default)]
pub struct ScrapeSummary {
    pub records: Vec<ReportRecord>,
    /// References skipped because the checkpoint ledger already had them.
    pub skipped: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
}

impl ScrapeSummary {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }
}

/// Drive the pipeline over `refs`, strictly sequentially: build the URL,
/// fetch, extract, append to `sink`, checkpoint in `history`.
///
/// `fetch` supplies the body for a detail URL; production passes a
/// reqwest-backed closure, tests a canned one. Any per-report failure skips
/// that report only: it is classified, logged with the country identifier,
/// and tallied. Failures of the sink or ledger are fatal, since continuing
/// would silently lose records.
pub async fn run_scrape<F, Fut>(
    refs: &[ReportRef],
    base_url: &str,
    fetch: F,
    sink: &mut CsvSink,
    history: &mut History,
) -> Result<ScrapeSummary>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, ScrapeError>>,
{
    let mut summary = ScrapeSummary::default();
    info!(reports = refs.len(), "downloading records");

    for reference in refs {
        if history.contains(&reference.report) {
            debug!(sdid = %reference.report, "already completed; skipping");
            summary.skipped += 1;
            continue;
        }

        let url = reference.detail_url(base_url);
        match scrape_one(reference, url, &fetch).await {
            Ok(record) => {
                info!(country = %reference.country, title = %record.title, "scraped");
                sink.append(&record)?;
                history.record(&reference.report)?;
                summary.records.push(record);
            }
            Err(err) => {
                warn!(
                    country = %reference.country,
                    sdid = %reference.report,
                    %err,
                    "error in link data, skipping"
                );
                match err {
                    ScrapeError::Http(_) => summary.fetch_failures += 1,
                    _ => summary.parse_failures += 1,
                }
            }
        }
    }

    info!(
        succeeded = summary.succeeded(),
        skipped = summary.skipped,
        fetch_failures = summary.fetch_failures,
        parse_failures = summary.parse_failures,
        "scrape finished"
    );
    Ok(summary)
}

async fn scrape_one<F, Fut>(
    reference: &ReportRef,
    url: String,
    fetch: &F,
) -> Result<ReportRecord, ScrapeError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String, ScrapeError>>,
{
    let body = fetch(url).await?;
    extract::extract_report(reference, &body)
}
