// src/error.rs

use thiserror::Error;

/// Why a single report was skipped. Per-report failures are classified and
/// tallied at the orchestration boundary; none of them abort the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or HTTP-status failure while fetching a detail page.
    #[error("http error: {0}")]
    Http(String),

    /// The detail page lacked the expected structure (title, tables, rows).
    #[error("parse error: {0}")]
    Parse(String),

    /// A `show_detail` anchor whose argument list could not be parsed into
    /// six identifiers.
    #[error("malformed reference: {0}")]
    MalformedRef(String),
}
