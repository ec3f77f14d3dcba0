//! Naver news search Open API backend.
//!
//! Queries `openapi.naver.com/v1/search/news.json` sorted by date. The API
//! wraps matched terms in `<b>` tags and returns RFC 2822 `pubDate` values;
//! both are handled later by the aggregator.

use super::{NewsSource, build_client};
use crate::models::CandidateRecord;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const SEARCH_URL: &str = "https://openapi.naver.com/v1/search/news.json";

/// Largest `display` value the API accepts.
pub const MAX_DISPLAY: usize = 100;

/// Credentials and query parameters for the Open API.
pub struct NaverApiSource {
    client: Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
    display: usize,
}

impl fmt::Debug for NaverApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaverApiSource")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("display", &self.display)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    originallink: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "pubDate")]
    pub_date: String,
}

impl NaverApiSource {
    /// Create a backend with the given credentials.
    ///
    /// `display` is clamped to `1..=MAX_DISPLAY`.
    pub fn new(
        client_id: String,
        client_secret: String,
        display: usize,
        timeout: Duration,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: SEARCH_URL.to_string(),
            client_id,
            client_secret,
            display: display.clamp(1, MAX_DISPLAY),
        })
    }

    fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}?query={}&display={}&sort=date",
            self.endpoint,
            urlencoding::encode(keyword),
            self.display
        )
    }
}

impl NewsSource for NaverApiSource {
    fn name(&self) -> &str {
        "naver-api"
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, keyword: &str) -> Result<Vec<CandidateRecord>, Box<dyn Error>> {
        let response = self
            .client
            .get(self.search_url(keyword))
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, body = %truncate_for_log(&body, 200), "Naver API returned an error status");
            return Err(format!("Naver API returned status {status}").into());
        }

        let records = parse_response(&body, keyword)?;
        debug!(count = records.len(), "Decoded Naver API items");
        Ok(records)
    }
}

/// Decode a search response body into candidate records for `keyword`.
fn parse_response(body: &str, keyword: &str) -> Result<Vec<CandidateRecord>, Box<dyn Error>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .map(|item| CandidateRecord {
            keyword: keyword.to_string(),
            title: item.title,
            description: item.description,
            link: item.link,
            original_link: Some(item.originallink).filter(|l| !l.trim().is_empty()),
            publish_date: item.pub_date,
        })
        .collect())
}
