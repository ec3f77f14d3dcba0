//! Run settings assembled from the config file and the command line.
//!
//! The optional YAML file mirrors the CLI options:
//!
//! ```yaml
//! keywords: [육군, 국방, 외교]
//! backend: api
//! client_id: abc
//! client_secret: def
//! mode: major-press
//! window_hours: 4
//! cluster: true
//! max_group_size: 3
//! similarity_threshold: 0.7
//! display: 30
//! pacing_ms: 500
//! timeout_secs: 10
//! format: grouped
//! ```
//!
//! Command-line values override file values, which override the defaults.

use crate::cli::{BackendKind, Cli};
use crate::cluster::ClusterOptions;
use crate::filters::{DEFAULT_WINDOW_HOURS, FilterChain, SearchMode};
use crate::outputs::text::ExportFormat;
use chrono::Duration;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument};

/// Keywords searched when none are configured.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "육군", "국방", "외교", "안보", "북한", "신병교육대", "훈련", "간부", "장교", "부사관", "병사",
    "용사", "군무원",
];

pub const DEFAULT_DISPLAY: usize = 30;
pub const DEFAULT_PACING_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Contents of the YAML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub keywords: Option<Vec<String>>,
    pub backend: Option<BackendKind>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub mode: Option<SearchMode>,
    pub window_hours: Option<i64>,
    pub recent: Option<bool>,
    pub major_press: Option<bool>,
    pub require_match: Option<bool>,
    pub video_only: Option<bool>,
    pub cluster: Option<bool>,
    pub max_group_size: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub max_features: Option<usize>,
    pub display: Option<usize>,
    pub pacing_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub format: Option<ExportFormat>,
}

/// Read and parse a YAML config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid config YAML.
#[instrument(level = "info")]
pub fn load_config(path: &str) -> Result<FileConfig, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    let config: FileConfig = serde_yaml::from_str(&text)?;
    debug!(?config.keywords, ?config.backend, "Loaded config file");
    Ok(config)
}

/// API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub keywords: Vec<String>,
    pub backend: BackendKind,
    /// Present whenever `backend` is [`BackendKind::Api`].
    pub credentials: Option<Credentials>,
    pub filters: FilterChain,
    /// `None` when clustering is off.
    pub cluster: Option<ClusterOptions>,
    pub display: usize,
    pub pacing: StdDuration,
    pub timeout: StdDuration,
    pub format: ExportFormat,
}

impl Settings {
    /// Merge command-line values over file values over defaults.
    ///
    /// # Errors
    ///
    /// Fails when the API backend is selected without credentials, or when
    /// a numeric option is out of range.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, Box<dyn Error>> {
        let keywords = if !cli.keywords.is_empty() {
            clean_keywords(&cli.keywords)
        } else if let Some(list) = &file.keywords {
            clean_keywords(list)
        } else {
            DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
        };
        if keywords.is_empty() {
            return Err("no keywords to search".into());
        }

        let backend = cli.backend.or(file.backend).unwrap_or_default();
        let client_id = cli.client_id.clone().or(file.client_id).filter(|s| !s.trim().is_empty());
        let client_secret = cli
            .client_secret
            .clone()
            .or(file.client_secret)
            .filter(|s| !s.trim().is_empty());
        let credentials = match (backend, client_id, client_secret) {
            (BackendKind::Api, Some(client_id), Some(client_secret)) => Some(Credentials {
                client_id,
                client_secret,
            }),
            (BackendKind::Api, _, _) => {
                return Err(
                    "the api backend needs NAVER_CLIENT_ID and NAVER_CLIENT_SECRET (or use --backend html)"
                        .into(),
                );
            }
            (BackendKind::Html, _, _) => None,
        };

        let window_hours = cli.window_hours.or(file.window_hours).unwrap_or(DEFAULT_WINDOW_HOURS);
        if window_hours <= 0 {
            return Err(format!("window_hours must be positive, got {window_hours}").into());
        }
        let window = Duration::try_hours(window_hours)
            .ok_or_else(|| format!("window_hours out of range: {window_hours}"))?;

        let mode = cli.mode.or(file.mode).unwrap_or_default();
        let mut filters = FilterChain::for_mode(mode, window);
        if cli.recent || file.recent.unwrap_or(false) {
            filters.recency = Some(window);
        }
        filters.major_press_only |= cli.major_press || file.major_press.unwrap_or(false);
        filters.require_keyword_match |= cli.require_match || file.require_match.unwrap_or(false);
        filters.video_only |= cli.video_only || file.video_only.unwrap_or(false);

        let cluster = if cli.cluster || file.cluster.unwrap_or(false) {
            let defaults = ClusterOptions::default();
            let options = ClusterOptions {
                max_group_size: cli
                    .max_group_size
                    .or(file.max_group_size)
                    .unwrap_or(defaults.max_group_size),
                similarity_threshold: cli
                    .similarity_threshold
                    .or(file.similarity_threshold)
                    .unwrap_or(defaults.similarity_threshold),
                max_features: file.max_features.unwrap_or(defaults.max_features),
            };
            if !(0.0..=1.0).contains(&options.similarity_threshold) {
                return Err(format!(
                    "similarity_threshold must be between 0 and 1, got {}",
                    options.similarity_threshold
                )
                .into());
            }
            Some(options)
        } else {
            None
        };

        let settings = Self {
            keywords,
            backend,
            credentials,
            filters,
            cluster,
            display: cli.display.or(file.display).unwrap_or(DEFAULT_DISPLAY),
            pacing: StdDuration::from_millis(cli.pacing_ms.or(file.pacing_ms).unwrap_or(DEFAULT_PACING_MS)),
            timeout: StdDuration::from_secs(
                cli.timeout_secs.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            format: cli.format.or(file.format).unwrap_or_default(),
        };
        info!(
            keywords = settings.keywords.len(),
            backend = ?settings.backend,
            mode = ?mode,
            clustering = settings.cluster.is_some(),
            "Resolved settings"
        );
        Ok(settings)
    }
}

/// Trim keywords, drop blanks and duplicates while keeping order.
fn clean_keywords(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}
