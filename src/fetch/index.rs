// src/fetch/index.rs

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::path::Path;
use tracing::warn;

use crate::error::ScrapeError;
use crate::report::ReportRef;

/// Marker identifying the in-page script call that carries report
/// identifiers. Anchors without it are not report links.
const SHOW_DETAIL_MARKER: &str = "javascript:show_detail";

/// Result of scanning one index page.
#[derive(Debug)]
pub struct IndexScan {
    /// References parsed from well-formed `show_detail` anchors, in document
    /// order.
    pub refs: Vec<ReportRef>,
    /// Marker anchors whose argument list did not parse into six tokens.
    pub malformed: usize,
}

/// Read a locally-saved index page and scan it for report references.
pub fn scan_index_file(path: impl AsRef<Path>, detail_flag: &str) -> Result<IndexScan> {
    let path = path.as_ref();
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("reading index page {}", path.display()))?;
    Ok(scan_index(&html, detail_flag))
}

/// Scan index HTML for anchors carrying `show_detail` calls and parse each
/// argument list into a [`ReportRef`]. Anchors without the marker are
/// silently dropped; marker anchors that fail to parse are logged and
/// counted, never fatal.
pub fn scan_index(html: &str, detail_flag: &str) -> IndexScan {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("anchor selector should parse");

    let mut refs = Vec::new();
    let mut malformed = 0;

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(SHOW_DETAIL_MARKER) {
            continue;
        }
        match parse_show_detail(href, detail_flag) {
            Ok(reference) => refs.push(reference),
            Err(err) => {
                warn!(href, %err, "skipping malformed index anchor");
                malformed += 1;
            }
        }
    }

    IndexScan { refs, malformed }
}

/// Parse one `show_detail(...)` href into a reference: capture the
/// parenthesized argument list, split on commas, trim whitespace and quote
/// characters. Exactly six tokens are required.
pub fn parse_show_detail(href: &str, detail_flag: &str) -> Result<ReportRef, ScrapeError> {
    let call = Regex::new(r"show_detail\s*\(([^)]*)\)").expect("show_detail regex should parse");

    let args = call
        .captures(href)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| ScrapeError::MalformedRef(href.to_string()))?;

    let tokens: Vec<String> = args
        .split(',')
        .map(|token| {
            token
                .trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .trim()
                .to_string()
        })
        .collect();

    let tokens: [String; 6] = tokens
        .try_into()
        .map_err(|_| ScrapeError::MalformedRef(href.to_string()))?;

    Ok(ReportRef::from_tokens(tokens, detail_flag))
}
