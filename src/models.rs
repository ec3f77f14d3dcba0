//! Data models for search results and their aggregated representations.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`CandidateRecord`]: Raw search hit returned by a news backend for one keyword
//! - [`Article`]: Normalized, deduplicated article keyed by its URL
//! - [`Cluster`]: Group of near-duplicate articles found by the clusterer
//! - [`ArticleView`]: Read-only view model handed to the front end

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A raw search hit as returned by a news backend.
///
/// Records are produced per keyword query and consumed immediately by the
/// aggregator; nothing keeps them around after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    /// The keyword whose query surfaced this record.
    pub keyword: String,
    /// Headline, possibly with `<b>` highlighting and HTML entities.
    pub title: String,
    /// Snippet text, possibly with markup.
    pub description: String,
    /// Backend link to the article. Used as the article identity.
    pub link: String,
    /// Publisher's own URL, when the backend provides one.
    pub original_link: Option<String>,
    /// Publish timestamp as an RFC 2822 string.
    pub publish_date: String,
}

/// A normalized news article.
///
/// Exactly one `Article` exists per distinct [`Article::url`] in a run.
/// When several keyword queries surface the same URL, their keyword
/// matches are merged with [`Article::merge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Identity key.
    pub url: String,
    /// Markup-free headline.
    pub title: String,
    /// Markup-free snippet.
    pub description: String,
    /// Parsed publish time. `None` when the backend value was missing or malformed.
    pub publish_time: Option<DateTime<FixedOffset>>,
    /// Publisher domain without `www.`, `None` if the URL could not be parsed.
    pub source_domain: Option<String>,
    /// Publisher display name.
    pub source_name: String,
    /// Input keywords found in the title or description.
    pub matched_keywords: BTreeSet<String>,
    /// Total number of keyword occurrences across every query that returned this article.
    pub match_count: usize,
}

impl Article {
    /// Fold another observation of the same URL into this article.
    ///
    /// Keyword sets are unioned and match counts added, so the final
    /// article does not depend on the order in which queries returned it.
    pub fn merge(&mut self, matched_keywords: BTreeSet<String>, match_count: usize) {
        self.matched_keywords.extend(matched_keywords);
        self.match_count += match_count;
    }

    /// Title and description joined for text analysis.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// A group of at least two articles judged to cover the same story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Stable identifier: the smallest input position among the grouped articles.
    pub id: usize,
    /// Member URLs, most keyword-relevant first.
    pub members: Vec<String>,
    /// Keywords matched by every member.
    pub common_keywords: BTreeSet<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.members.iter().any(|m| m == url)
    }
}

/// What the front end shows for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleView {
    /// Identity key, used by the selection set.
    pub url: String,
    pub title: String,
    /// Publisher display name.
    pub press: String,
    /// Link rewritten to its preferred form.
    pub canonical_url: String,
    /// `YYYY-MM-DD HH:MM` in the publisher's offset, or a placeholder.
    pub published: String,
    pub matched_keywords: Vec<String>,
    pub cluster_id: Option<usize>,
    pub common_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str) -> Article {
        Article {
            url: url.to_string(),
            title: "Army holds winter drill".to_string(),
            description: "Troops gathered".to_string(),
            publish_time: None,
            source_domain: Some("example.com".to_string()),
            source_name: "example.com".to_string(),
            matched_keywords: BTreeSet::new(),
            match_count: 0,
        }
    }

    #[test]
    fn test_merge_unions_keywords_and_adds_counts() {
        let mut a = article("https://example.com/a");
        a.merge(BTreeSet::from(["army".to_string()]), 2);
        a.merge(
            BTreeSet::from(["army".to_string(), "navy".to_string()]),
            3,
        );

        assert_eq!(
            a.matched_keywords,
            BTreeSet::from(["army".to_string(), "navy".to_string()])
        );
        assert_eq!(a.match_count, 5);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let first = BTreeSet::from(["army".to_string()]);
        let second = BTreeSet::from(["navy".to_string()]);

        let mut a = article("https://example.com/a");
        a.merge(first.clone(), 1);
        a.merge(second.clone(), 4);

        let mut b = article("https://example.com/a");
        b.merge(second, 4);
        b.merge(first, 1);

        assert_eq!(a, b);
    }

    #[test]
    fn test_article_text_joins_title_and_description() {
        let a = article("https://example.com/a");
        assert_eq!(a.text(), "Army holds winter drill Troops gathered");
    }

    #[test]
    fn test_article_serialization() {
        let a = article("https://example.com/a");
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("https://example.com/a"));
        let back: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn test_cluster_contains() {
        let c = Cluster {
            id: 0,
            members: vec!["a".to_string(), "b".to_string()],
            common_keywords: BTreeSet::new(),
        };
        assert_eq!(c.len(), 2);
        assert!(c.contains("b"));
        assert!(!c.contains("c"));
    }
}
