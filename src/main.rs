// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use wahidscraper::{
    error::ScrapeError,
    fetch::{self, detail::DEFAULT_BASE_URL},
    history::History,
    output::CsvSink,
    scrape,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape outbreak reports from a saved WAHID index page")]
struct Args {
    /// Locally-saved index page listing the outbreak reports
    index: PathBuf,

    /// Base name for the outputs: `<out>.csv` and `<out>-species.csv`
    #[arg(long, default_value = "outbreaks")]
    out: String,

    /// Value passed through as the `detail` query parameter
    #[arg(long, default_value = "1")]
    detail: String,

    /// Detail-page endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Checkpoint ledger path; defaults to `<out>-history.csv`
    #[arg(long)]
    history: Option<PathBuf>,

    /// Ignore previously checkpointed reports and scrape everything again
    #[arg(long, default_value_t = false)]
    no_resume: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let base_url = Url::parse(&args.base_url)
        .with_context(|| format!("parsing base URL {}", args.base_url))?;

    // ─── 2) scan the index for report references ─────────────────────
    let scan = fetch::index::scan_index_file(&args.index, &args.detail)?;
    if scan.malformed > 0 {
        warn!(count = scan.malformed, "malformed show_detail anchors in index");
    }
    info!(reports = scan.refs.len(), "index scanned");
    if scan.refs.len() > 20 {
        info!("large report set; this will take a while");
    }

    // ─── 3) load the checkpoint ledger ───────────────────────────────
    let history_path = args
        .history
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}-history.csv", args.out)));
    let mut history = History::open(&history_path)?;
    if args.no_resume {
        history.reset();
    } else if !history.is_empty() {
        info!(completed = history.len(), "resuming; completed reports will be skipped");
    }

    // ─── 4) open outputs and run ─────────────────────────────────────
    let mut sink = CsvSink::open(&args.out)?;
    let client = Client::new();
    let fetch_page = |url: String| {
        let client = client.clone();
        async move {
            fetch::detail::fetch_detail(&client, &url)
                .await
                .map_err(|err| ScrapeError::Http(format!("{err:#}")))
        }
    };

    let summary = scrape::run_scrape(
        &scan.refs,
        base_url.as_str(),
        fetch_page,
        &mut sink,
        &mut history,
    )
    .await?;

    info!(
        succeeded = summary.succeeded(),
        skipped = summary.skipped,
        fetch_failures = summary.fetch_failures,
        parse_failures = summary.parse_failures,
        main_csv = %format!("{}.csv", args.out),
        species_csv = %format!("{}-species.csv", args.out),
        "all done"
    );
    Ok(())
}
