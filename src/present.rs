//! Boundary between the pipeline and whatever front end shows the results.
//!
//! The pipeline hands over a ranked, read-only list of [`ArticleView`]s.
//! The front end owns a [`Selection`] of article URLs and passes it back
//! when exporting.

use crate::links::canonicalize;
use crate::models::{Article, ArticleView, Cluster};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Shown instead of a timestamp when the publish time is unknown.
pub const UNKNOWN_TIME: &str = "시간 없음";

/// Sort articles newest first. Unknown publish times go last; ties keep
/// their incoming order.
pub fn rank(articles: impl IntoIterator<Item = Article>) -> Vec<Article> {
    let mut ranked: Vec<Article> = articles.into_iter().collect();
    ranked.sort_by_key(|a| (a.publish_time.is_none(), Reverse(a.publish_time)));
    ranked
}

/// Build view models for `ranked` articles, annotated with cluster membership.
pub fn views(ranked: &[Article], clusters: &[Cluster]) -> Vec<ArticleView> {
    let membership: BTreeMap<&str, &Cluster> = clusters
        .iter()
        .flat_map(|c| c.members.iter().map(move |url| (url.as_str(), c)))
        .collect();

    ranked
        .iter()
        .map(|article| {
            let cluster = membership.get(article.url.as_str());
            ArticleView {
                url: article.url.clone(),
                title: article.title.clone(),
                press: article.source_name.clone(),
                canonical_url: canonicalize(&article.url),
                published: article
                    .publish_time
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| UNKNOWN_TIME.to_string()),
                matched_keywords: article.matched_keywords.iter().cloned().collect(),
                cluster_id: cluster.map(|c| c.id),
                common_keywords: cluster
                    .map(|c| c.common_keywords.iter().cloned().collect())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// The set of article URLs the user has ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    urls: BTreeSet<String>,
}

impl Selection {
    /// Select every article in `views`.
    pub fn all(views: &[ArticleView]) -> Self {
        Self {
            urls: views.iter().map(|v| v.url.clone()).collect(),
        }
    }

    /// An empty selection.
    pub fn none() -> Self {
        Self::default()
    }

    /// Selection from 1-based positions in `views`.
    ///
    /// An empty `include` starts from every article; `exclude` is applied
    /// afterwards, then every position in `flip` is toggled. Positions
    /// outside the list are logged and ignored.
    pub fn from_positions(
        views: &[ArticleView],
        include: &[usize],
        exclude: &[usize],
        flip: &[usize],
    ) -> Self {
        let at = |pos: usize| match pos.checked_sub(1).and_then(|i| views.get(i)) {
            Some(view) => Some(view.url.as_str()),
            None => {
                warn!(position = pos, available = views.len(), "Ignoring out-of-range article position");
                None
            }
        };

        let mut selection = if include.is_empty() {
            Self::all(views)
        } else {
            let mut s = Self::none();
            include.iter().filter_map(|&p| at(p)).for_each(|url| s.select(url));
            s
        };
        exclude.iter().filter_map(|&p| at(p)).for_each(|url| selection.deselect(url));
        for url in flip.iter().filter_map(|&p| at(p)) {
            let selected = selection.toggle(url);
            debug!(%url, selected, "Toggled article");
        }
        selection
    }

    pub fn select(&mut self, url: &str) {
        self.urls.insert(url.to_string());
    }

    pub fn deselect(&mut self, url: &str) {
        self.urls.remove(url);
    }

    /// Flip `url` and return whether it is now selected.
    pub fn toggle(&mut self, url: &str) -> bool {
        if self.urls.remove(url) {
            false
        } else {
            self.urls.insert(url.to_string());
            true
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
