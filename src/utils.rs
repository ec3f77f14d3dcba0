//! Text helpers shared by the pipeline stages.
//!
//! This module provides helper functions used throughout the application:
//! - Markup stripping and entity decoding for backend snippets
//! - Timestamp parsing that degrades to "unknown" instead of failing
//! - Keyword occurrence counting and tokenization for similarity
//! - String truncation for logging and output path validation

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").unwrap());

/// Remove HTML tags and decode entities, folding runs of whitespace.
///
/// Backends highlight matches with `<b>` and escape quotes as `&quot;`;
/// both disappear here.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_markup("<b>육군</b> &quot;훈련&quot;"), "육군 \"훈련\"");
/// ```
pub fn strip_markup(s: &str) -> String {
    let fragment = Html::parse_fragment(s);
    let text = fragment.root_element().text().collect::<String>();
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Parse an RFC 2822 timestamp such as `Sun, 18 Oct 2026 21:03:00 +0900`.
///
/// Returns `None` for empty or malformed input.
pub fn parse_publish_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(s).ok()
}

/// Count non-overlapping, case-insensitive occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    haystack.to_lowercase().matches(needle.as_str()).count()
}

/// Lower-case `text`, replace punctuation with spaces and split into terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a character boundary at or below `max` bytes
/// with a byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure the directory that will hold `file_path` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(path = %file_path))]
pub async fn ensure_parent_writable(file_path: &str) -> Result<(), Box<dyn Error>> {
    let dir = match Path::new(file_path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
