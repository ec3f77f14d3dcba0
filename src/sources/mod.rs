//! News search backends.
//!
//! Every backend answers one question: "what does a search for this keyword
//! return right now?" The answer is a list of [`CandidateRecord`]s that the
//! aggregator normalizes.
//!
//! # Supported Backends
//!
//! | Backend | Module | Method | Notes |
//! |---------|--------|--------|-------|
//! | Naver Open API | [`naver_api`] | JSON search API | Requires client id and secret |
//! | Naver search page | [`naver_html`] | HTML scraping | No credentials; layout-dependent |
//!
//! Failures are never fatal to a run: [`fetch_or_empty`] logs them and
//! substitutes an empty result for that keyword.

use crate::models::CandidateRecord;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub mod naver_api;
pub mod naver_html;

pub use naver_api::NaverApiSource;
pub use naver_html::NaverHtmlSource;

/// User agent sent with every backend request.
const USER_AGENT: &str = concat!("keyword_news/", env!("CARGO_PKG_VERSION"));

/// A news search backend queried once per keyword.
#[allow(async_fn_in_trait)]
pub trait NewsSource {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one search for `keyword`.
    ///
    /// # Errors
    ///
    /// Transport errors, timeouts, non-success statuses and undecodable
    /// bodies are all reported as errors.
    async fn fetch(&self, keyword: &str) -> Result<Vec<CandidateRecord>, Box<dyn Error>>;
}

/// The backend selected at start-up.
#[derive(Debug)]
pub enum Backend {
    Api(NaverApiSource),
    Html(NaverHtmlSource),
}

impl NewsSource for Backend {
    fn name(&self) -> &str {
        match self {
            Backend::Api(s) => s.name(),
            Backend::Html(s) => s.name(),
        }
    }

    async fn fetch(&self, keyword: &str) -> Result<Vec<CandidateRecord>, Box<dyn Error>> {
        match self {
            Backend::Api(s) => s.fetch(keyword).await,
            Backend::Html(s) => s.fetch(keyword).await,
        }
    }
}

/// Build the HTTP client shared by a backend's requests.
pub fn build_client(timeout: Duration) -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Query `source` for `keyword`, turning any failure into an empty result.
#[instrument(level = "info", skip(source), fields(backend = source.name()))]
pub async fn fetch_or_empty<S: NewsSource>(source: &S, keyword: &str) -> Vec<CandidateRecord> {
    match source.fetch(keyword).await {
        Ok(records) => {
            info!(count = records.len(), "Fetched candidates");
            records
        }
        Err(e) => {
            warn!(error = %e, "Search failed; continuing without results for this keyword");
            Vec::new()
        }
    }
}
