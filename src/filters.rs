//! Predicates that decide which aggregated articles are kept.
//!
//! A [`FilterChain`] combines independent predicates; an article survives
//! only if every enabled predicate accepts it. [`SearchMode`] names the
//! combinations the front end offers.

use crate::models::Article;
use crate::press::is_major_press;
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Default recency window.
pub const DEFAULT_WINDOW_HOURS: i64 = 4;

/// Words that mark a result as carrying video.
const VIDEO_MARKERS_DESCRIPTION: &[&str] = &["동영상", "영상"];
const VIDEO_MARKERS_TITLE: &[&str] = &["영상", "동영상", "영상보기"];

/// Preset filter combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Keep everything.
    #[default]
    All,
    /// Only recognized major outlets.
    MajorPress,
    /// Video reports from major outlets published within the window.
    RecentVideo,
}

/// Enabled predicates. The default keeps every article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterChain {
    /// Keep only articles published at most this long ago.
    pub recency: Option<Duration>,
    pub major_press_only: bool,
    pub require_keyword_match: bool,
    pub video_only: bool,
}

impl FilterChain {
    /// The predicates a search mode stands for.
    pub fn for_mode(mode: SearchMode, window: Duration) -> Self {
        match mode {
            SearchMode::All => Self::default(),
            SearchMode::MajorPress => Self {
                major_press_only: true,
                ..Self::default()
            },
            SearchMode::RecentVideo => Self {
                recency: Some(window),
                major_press_only: true,
                video_only: true,
                ..Self::default()
            },
        }
    }

    /// True if `article` passes every enabled predicate at time `now`.
    pub fn retains(&self, article: &Article, now: DateTime<Utc>) -> bool {
        if let Some(window) = self.recency {
            if !is_recent(article, now, window) {
                return false;
            }
        }
        if self.major_press_only && !is_major_press(&article.source_name) {
            return false;
        }
        if self.require_keyword_match && article.matched_keywords.is_empty() {
            return false;
        }
        if self.video_only && !is_video(article) {
            return false;
        }
        true
    }

    /// Drop every article the chain rejects.
    pub fn apply(&self, articles: &mut BTreeMap<String, Article>, now: DateTime<Utc>) {
        let before = articles.len();
        articles.retain(|_, article| self.retains(article, now));
        info!(before, after = articles.len(), filters = ?self, "Applied filters");
    }
}

/// Published within `window` of `now`, boundary included.
///
/// Articles with an unknown publish time never count as recent.
pub fn is_recent(article: &Article, now: DateTime<Utc>, window: Duration) -> bool {
    match article.publish_time {
        Some(published) => now.signed_duration_since(published) <= window,
        None => false,
    }
}

/// The title or snippet advertises a video.
pub fn is_video(article: &Article) -> bool {
    VIDEO_MARKERS_DESCRIPTION
        .iter()
        .any(|m| article.description.contains(m))
        || VIDEO_MARKERS_TITLE.iter().any(|m| article.title.contains(m))
}
