// src/history/mod.rs

use anyhow::{Context, Result};
use chrono::Utc;
use std::{
    collections::HashSet,
    fs::{self, File, OpenOptions},
    path::PathBuf,
};

const HEADERS: [&str; 2] = ["sdid", "completed_at"];

/// Checkpoint ledger of report ids that have already been scraped and
/// written. A rerun loads the ledger and skips completed reports, so an
/// interrupted run picks up where it failed.
pub struct History {
    writer: csv::Writer<File>,
    seen: HashSet<String>,
}

impl History {
    /// Open the ledger at `path`, loading ids recorded by earlier runs.
    /// A missing file starts an empty ledger; a new or empty file gets the
    /// header row immediately.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let mut seen = HashSet::new();
        if path.is_file() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .from_path(&path)
                .with_context(|| format!("opening history ledger {}", path.display()))?;
            for result in reader.records() {
                let record = result
                    .with_context(|| format!("reading history ledger {}", path.display()))?;
                if let Some(sdid) = record.get(0).filter(|s| !s.is_empty()) {
                    seen.insert(sdid.to_string());
                }
            }
        }

        let fresh = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening history ledger {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(HEADERS)?;
            writer.flush()?;
        }

        Ok(Self { writer, seen })
    }

    /// Whether `sdid` was completed by this run or a previous one.
    pub fn contains(&self, sdid: &str) -> bool {
        self.seen.contains(sdid)
    }

    /// Number of ids currently in the ledger.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Append one completed report id with a timestamp and flush, so the
    /// checkpoint survives a crash on the very next report.
    pub fn record(&mut self, sdid: &str) -> Result<()> {
        let completed_at = Utc::now().to_rfc3339();
        self.writer
            .write_record([sdid, completed_at.as_str()])
            .context("recording history entry")?;
        self.writer.flush().context("flushing history ledger")?;
        self.seen.insert(sdid.to_string());
        Ok(())
    }

    /// Forget previously recorded ids for this run only. The ledger file is
    /// left in place and new completions are still appended to it.
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}
