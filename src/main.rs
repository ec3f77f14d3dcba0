//! # Keyword News
//!
//! A keyword-driven news aggregation tool. It searches a news backend for a
//! list of keywords, merges the hits into one deduplicated article set,
//! filters and optionally clusters near-duplicate reports, and exports the
//! selected articles as a plain-text clipping list.
//!
//! ## Usage
//!
//! ```sh
//! NAVER_CLIENT_ID=... NAVER_CLIENT_SECRET=... keyword_news -k 육군,국방 --cluster -f grouped
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one search per keyword, sequential and paced
//! 2. **Aggregation**: normalize, deduplicate by URL, merge keyword matches
//! 3. **Filtering**: recency, major press, keyword match, video
//! 4. **Clustering**: TF-IDF vectors with average-linkage grouping (optional)
//! 5. **Presentation**: rank newest first, build views, export the selection

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod cluster;
mod config;
mod filters;
mod links;
mod models;
mod outputs;
mod present;
mod press;
mod sources;
mod utils;

use cli::{BackendKind, Cli};
use config::{FileConfig, Settings};
use outputs::json::{Snapshot, write_snapshot};
use outputs::text::{copy_line, export};
use present::Selection;
use sources::{Backend, NaverApiSource, NaverHtmlSource};
use utils::ensure_parent_writable;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("keyword_news starting up");

    let args = Cli::parse();
    debug!(?args.keywords, ?args.config, ?args.backend, "Parsed CLI arguments");

    let file = match &args.config {
        Some(path) => config::load_config(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file)?;

    // Early check: output locations are writable
    for path in [&args.output, &args.json_output].into_iter().flatten() {
        if let Err(e) = ensure_parent_writable(path).await {
            error!(%path, error = %e, "Output location is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    let backend = build_backend(&settings)?;

    // ---- Fetch and merge ----
    let mut articles = aggregate::aggregate(&backend, &settings.keywords, settings.pacing).await;

    // ---- Filter ----
    settings.filters.apply(&mut articles, Utc::now());

    // ---- Rank and cluster ----
    let ranked = present::rank(articles.into_values());
    let clusters = match &settings.cluster {
        Some(options) => cluster::cluster(&ranked, options),
        None => Vec::new(),
    };
    let views = present::views(&ranked, &clusters);

    if views.is_empty() {
        warn!("No articles matched; nothing to export");
    }
    for (i, view) in views.iter().enumerate() {
        info!(
            position = i + 1,
            published = %view.published,
            keywords = ?view.matched_keywords,
            cluster = ?view.cluster_id,
            "{}",
            copy_line(view)
        );
    }

    // ---- Export ----
    let selection = Selection::from_positions(&views, &args.select, &args.exclude, &args.toggle);
    if selection.is_empty() && !views.is_empty() {
        warn!("Every article was deselected; the export will be empty");
    }
    info!(selected = selection.len(), total = views.len(), format = ?settings.format, "Exporting selection");
    let text = export(&views, &clusters, &selection, settings.format);

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &text).await?;
            info!(%path, "Wrote clipping list");
        }
        None => println!("{text}"),
    }

    if let Some(path) = &args.json_output {
        let snapshot = Snapshot {
            generated_at: Utc::now(),
            keywords: settings.keywords.clone(),
            articles: views,
            clusters,
        };
        if let Err(e) = write_snapshot(&snapshot, path).await {
            error!(%path, error = %e, "Failed to write JSON snapshot");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        "keyword_news completed in {:.2}s",
        elapsed.as_secs_f64()
    );

    Ok(())
}

/// Construct the backend named in `settings`.
fn build_backend(settings: &Settings) -> Result<Backend, Box<dyn Error>> {
    let backend = match (settings.backend, &settings.credentials) {
        (BackendKind::Api, Some(creds)) => Backend::Api(NaverApiSource::new(
            creds.client_id.clone(),
            creds.client_secret.clone(),
            settings.display,
            settings.timeout,
        )?),
        (BackendKind::Api, None) => return Err("missing API credentials".into()),
        (BackendKind::Html, _) => Backend::Html(NaverHtmlSource::new(settings.timeout)?),
    };
    info!(backend = ?settings.backend, "Backend ready");
    Ok(backend)
}
