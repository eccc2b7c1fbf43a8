// src/fetch/detail.rs

use anyhow::{Context, Result};
use reqwest::Client;

/// Detail-page endpoint of the WAHID disease-information interface.
pub const DEFAULT_BASE_URL: &str =
    "http://www.oie.int/wahis_2/public/wahid.php/Diseaseinformation/statusdetail/popup";

/// Fetch one detail page and return its body text. Network errors and
/// non-success statuses propagate; the orchestrator decides what to skip.
pub async fn fetch_detail(client: &Client, url: &str) -> Result<String> {
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    Ok(body)
}
