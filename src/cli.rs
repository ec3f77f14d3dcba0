//! Command-line interface definitions for Keyword News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials can also come from environment variables, and every tuning
//! option can instead be set in a YAML config file (see [`crate::config`]).
//! Values given on the command line win over the config file.

use crate::filters::SearchMode;
use crate::outputs::text::ExportFormat;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Which news backend to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Naver Open API (needs client id and secret).
    #[default]
    Api,
    /// Naver search results page.
    Html,
}

/// Command-line arguments for the Keyword News application.
///
/// # Examples
///
/// ```sh
/// # Default keyword list, everything from the last search
/// keyword_news
///
/// # Own keywords, major outlets only, grouped by story
/// keyword_news -k 육군,국방 --mode major-press --cluster --format grouped
///
/// # Keep articles 1, 2 and 5 and save the clipping list
/// keyword_news --select 1,2,5 -o news.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keywords to search, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// News backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Naver Open API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Naver Open API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Filter preset
    #[arg(long, value_enum)]
    pub mode: Option<SearchMode>,

    /// Recency window in hours for recency filtering
    #[arg(long)]
    pub window_hours: Option<i64>,

    /// Only keep articles published within the recency window
    #[arg(long)]
    pub recent: bool,

    /// Only keep recognized major outlets
    #[arg(long)]
    pub major_press: bool,

    /// Only keep articles whose text contains at least one keyword
    #[arg(long)]
    pub require_match: bool,

    /// Only keep video reports
    #[arg(long)]
    pub video_only: bool,

    /// Group near-duplicate articles
    #[arg(long)]
    pub cluster: bool,

    /// Largest number of articles reported per cluster
    #[arg(long)]
    pub max_group_size: Option<usize>,

    /// Cosine similarity needed to treat two articles as the same story
    #[arg(long)]
    pub similarity_threshold: Option<f64>,

    /// Results requested per keyword
    #[arg(long)]
    pub display: Option<usize>,

    /// Delay between keyword searches in milliseconds
    #[arg(long)]
    pub pacing_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Layout of the exported text
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// 1-based positions of the articles to export, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// 1-based positions of articles to leave out of the export, comma separated
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Vec<usize>,

    /// 1-based positions whose selection is flipped last, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub toggle: Vec<usize>,

    /// Write the exported text to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also write a JSON snapshot of the results to this file
    #[arg(long)]
    pub json_output: Option<String>,
}
