//! Groups articles that report the same story.
//!
//! Articles are turned into TF-IDF vectors over their title and snippet,
//! then merged bottom-up with average linkage until no two groups are
//! closer than the cosine distance cutoff `1 - similarity_threshold`.
//! The number of stories is not known up front, so there is no target
//! cluster count.
//!
//! # Steps
//!
//! 1. Tokenize `title + " " + description` (lower-cased, punctuation removed)
//! 2. Keep the `max_features` most frequent terms as the vocabulary
//! 3. Weight with smoothed IDF and L2-normalize each row
//! 4. Agglomerate with average linkage on cosine distance
//! 5. Drop singletons, cap oversized groups by keyword relevance

use crate::models::{Article, Cluster};
use crate::utils::tokenize;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument};

/// Tuning knobs for [`cluster`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Largest number of articles reported per cluster.
    pub max_group_size: usize,
    /// Minimum average cosine similarity for two groups to merge.
    pub similarity_threshold: f64,
    /// Vocabulary size cap.
    pub max_features: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_group_size: 3,
            similarity_threshold: 0.7,
            max_features: 1000,
        }
    }
}

/// Find groups of near-duplicate articles.
///
/// Returns clusters of at least two articles, largest first. Fewer than two
/// articles, or articles with no usable text, produce no clusters.
#[instrument(level = "info", skip(articles), fields(article_count = articles.len()))]
pub fn cluster(articles: &[Article], options: &ClusterOptions) -> Vec<Cluster> {
    if articles.len() < 2 {
        return Vec::new();
    }

    let documents: Vec<Vec<String>> = articles.iter().map(|a| tokenize(&a.text())).collect();
    let Some(vectors) = tfidf(&documents, options.max_features) else {
        debug!("Empty vocabulary; skipping clustering");
        return Vec::new();
    };

    let cutoff = 1.0 - options.similarity_threshold;
    let groups = agglomerate(&vectors, cutoff);

    let mut clusters: Vec<Cluster> = groups
        .into_iter()
        .filter(|g| g.len() >= 2)
        .map(|g| build_cluster(articles, g, options.max_group_size.max(2)))
        .collect();
    clusters.sort_by(|a, b| b.len().cmp(&a.len()).then(a.id.cmp(&b.id)));

    info!(clusters = clusters.len(), "Clustered similar articles");
    clusters
}

/// Sparse L2-normalized TF-IDF rows, or `None` if no document has any term.
///
/// Uses the smoothed IDF `ln((1 + n) / (1 + df)) + 1`.
fn tfidf(documents: &[Vec<String>], max_features: usize) -> Option<Vec<HashMap<usize, f64>>> {
    let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
    for term in documents.iter().flatten() {
        *corpus_counts.entry(term.as_str()).or_default() += 1;
    }
    if corpus_counts.is_empty() || max_features == 0 {
        return None;
    }

    let vocabulary: HashMap<&str, usize> = corpus_counts
        .into_iter()
        .sorted_by(|(ta, ca), (tb, cb)| cb.cmp(ca).then(ta.cmp(tb)))
        .take(max_features)
        .enumerate()
        .map(|(index, (term, _))| (term, index))
        .collect();

    let counts: Vec<HashMap<usize, f64>> = documents
        .iter()
        .map(|doc| {
            let mut tf = HashMap::new();
            for term in doc {
                if let Some(&index) = vocabulary.get(term.as_str()) {
                    *tf.entry(index).or_insert(0.0) += 1.0;
                }
            }
            tf
        })
        .collect();

    let mut document_frequency = vec![0usize; vocabulary.len()];
    for row in &counts {
        for &index in row.keys() {
            document_frequency[index] += 1;
        }
    }

    let n = documents.len() as f64;
    let idf: Vec<f64> = document_frequency
        .iter()
        .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    Some(
        counts
            .into_iter()
            .map(|mut row| {
                for (index, weight) in row.iter_mut() {
                    *weight *= idf[*index];
                }
                let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.values_mut().for_each(|w| *w /= norm);
                }
                row
            })
            .collect(),
    )
}

/// Cosine distance between two normalized rows. Empty rows are maximally distant.
fn cosine_distance(a: &HashMap<usize, f64>, b: &HashMap<usize, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(index, w)| large.get(index).map(|v| w * v))
        .sum();
    (1.0 - dot).max(0.0)
}

/// Average-linkage agglomerative clustering.
///
/// Repeatedly merges the closest pair of groups while their distance is at
/// most `cutoff`. Ties go to the pair found first in index order. Returns
/// every group, singletons included, with members in ascending index order.
fn agglomerate(vectors: &[HashMap<usize, f64>], cutoff: f64) -> Vec<Vec<usize>> {
    let n = vectors.len();
    let mut distance = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = cosine_distance(&vectors[i], &vectors[j]);
            distance[i][j] = d;
            distance[j][i] = d;
        }
    }

    let mut groups: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();

    loop {
        let mut closest: Option<(usize, usize, f64)> = None;
        for i in 0..n {
            if groups[i].is_none() {
                continue;
            }
            for j in (i + 1)..n {
                if groups[j].is_none() {
                    continue;
                }
                let d = distance[i][j];
                if closest.is_none_or(|(_, _, best)| d < best) {
                    closest = Some((i, j, d));
                }
            }
        }

        let Some((i, j, d)) = closest else { break };
        if d > cutoff {
            break;
        }

        let (Some(mut merged), Some(absorbed)) = (groups[i].take(), groups[j].take()) else {
            break;
        };
        let (size_i, size_j) = (merged.len() as f64, absorbed.len() as f64);

        // Lance-Williams update for average linkage
        for k in 0..n {
            if k == i || k == j || groups[k].is_none() {
                continue;
            }
            let updated = (size_i * distance[i][k] + size_j * distance[j][k]) / (size_i + size_j);
            distance[i][k] = updated;
            distance[k][i] = updated;
        }

        merged.extend(absorbed);
        merged.sort_unstable();
        groups[i] = Some(merged);
    }

    groups.into_iter().flatten().collect()
}

/// Turn a group of article indices into a capped [`Cluster`].
fn build_cluster(articles: &[Article], group: Vec<usize>, max_group_size: usize) -> Cluster {
    let id = group.iter().copied().min().unwrap_or_default();

    // stable sort keeps input order among equal match counts
    let members: Vec<usize> = group
        .into_iter()
        .sorted_by(|a, b| articles[*b].match_count.cmp(&articles[*a].match_count))
        .take(max_group_size)
        .collect();

    let common_keywords = common_keywords(members.iter().map(|&i| &articles[i]));

    Cluster {
        id,
        members: members.iter().map(|&i| articles[i].url.clone()).collect(),
        common_keywords,
    }
}

/// Keywords matched by every article; empty if any article matched none.
fn common_keywords<'a>(mut articles: impl Iterator<Item = &'a Article>) -> BTreeSet<String> {
    let Some(first) = articles.next() else {
        return BTreeSet::new();
    };
    articles.fold(first.matched_keywords.clone(), |acc, article| {
        acc.intersection(&article.matched_keywords).cloned().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, title: &str, description: &str, keywords: &[&str], match_count: usize) -> Article {
        Article {
            url: url.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            publish_time: None,
            source_domain: None,
            source_name: "example.com".to_string(),
            matched_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            match_count,
        }
    }

    const DRILL_WIRE: &str = "The army began its annual winter drill on Monday near the border.";

    #[test]
    fn test_near_duplicates_cluster_and_unrelated_is_dropped() {
        let articles = vec![
            article("a", "Army holds winter drill", DRILL_WIRE, &["army"], 1),
            article("b", "Army conducts winter drill", DRILL_WIRE, &["army"], 1),
            article(
                "c",
                "Stock market rallies",
                "Shares rose sharply in early trading after the rate decision.",
                &[],
                0,
            ),
        ];

        let clusters = cluster(&articles, &ClusterOptions::default());

        assert_eq!(clusters.len(), 1);
        let members: BTreeSet<&str> = clusters[0].members.iter().map(String::as_str).collect();
        assert_eq!(members, BTreeSet::from(["a", "b"]));
        assert_eq!(clusters[0].id, 0);
        assert_eq!(clusters[0].common_keywords, BTreeSet::from(["army".to_string()]));
    }

    #[test]
    fn test_title_only_near_duplicates_need_looser_threshold() {
        // without a shared snippet the one-word difference leaves cosine near 0.63
        let articles = vec![
            article("a", "Army holds winter drill", "", &["army"], 1),
            article("b", "Army conducts winter drill", "", &["army"], 1),
            article("c", "Stock market rallies", "", &[], 0),
        ];

        assert!(cluster(&articles, &ClusterOptions::default()).is_empty());

        let loose = ClusterOptions {
            similarity_threshold: 0.6,
            ..ClusterOptions::default()
        };
        let clusters = cluster(&articles, &loose);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec!["a", "b"]);
    }

    #[test]
    fn test_no_cluster_smaller_than_two() {
        let articles = vec![
            article("a", "alpha beta gamma", "", &[], 0),
            article("b", "delta epsilon zeta", "", &[], 0),
            article("c", "eta theta iota", "", &[], 0),
        ];
        assert!(cluster(&articles, &ClusterOptions::default()).is_empty());
    }

    #[test]
    fn test_fewer_than_two_articles() {
        assert!(cluster(&[], &ClusterOptions::default()).is_empty());
        let one = vec![article("a", "Army holds winter drill", "", &[], 0)];
        assert!(cluster(&one, &ClusterOptions::default()).is_empty());
    }

    #[test]
    fn test_empty_text_corpus() {
        let articles = vec![
            article("a", "!!!", "...", &[], 0),
            article("b", "???", "", &[], 0),
        ];
        assert!(cluster(&articles, &ClusterOptions::default()).is_empty());
    }

    #[test]
    fn test_oversized_cluster_keeps_most_relevant() {
        let text = "navy destroyer joins allied exercise in the east sea";
        let articles = vec![
            article("a", text, "", &["navy"], 1),
            article("b", text, "", &["navy"], 5),
            article("c", text, "", &["navy"], 3),
            article("d", text, "", &["navy"], 3),
            article("e", text, "", &["navy"], 2),
        ];

        let clusters = cluster(&articles, &ClusterOptions::default());

        assert_eq!(clusters.len(), 1);
        // c and d tie on 3; c comes first in the input
        assert_eq!(clusters[0].members, vec!["b", "c", "d"]);
        assert_eq!(clusters[0].id, 0);
    }

    #[test]
    fn test_cap_never_below_pairs() {
        let text = "identical headline about the joint drill";
        let articles = vec![
            article("a", text, "", &[], 0),
            article("b", text, "", &[], 0),
        ];
        let options = ClusterOptions {
            max_group_size: 1,
            ..ClusterOptions::default()
        };
        assert_eq!(cluster(&articles, &options)[0].len(), 2);
    }

    #[test]
    fn test_clusters_sorted_by_size_then_id() {
        let pair = "summit talks resume between the two leaders";
        let triple = "typhoon makes landfall on the southern coast";
        let articles = vec![
            article("p1", pair, "", &[], 0),
            article("t1", triple, "", &[], 0),
            article("p2", pair, "", &[], 0),
            article("t2", triple, "", &[], 0),
            article("t3", triple, "", &[], 0),
        ];

        let clusters = cluster(&articles, &ClusterOptions::default());

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[0].id, 1);
        assert_eq!(clusters[1].len(), 2);
        assert_eq!(clusters[1].id, 0);
    }

    #[test]
    fn test_common_keywords_intersection() {
        let text = "army and navy hold a combined landing drill";
        let articles = vec![
            article("a", text, "", &["army", "navy"], 2),
            article("b", text, "", &["navy"], 1),
        ];
        let clusters = cluster(&articles, &ClusterOptions::default());
        assert_eq!(clusters[0].common_keywords, BTreeSet::from(["navy".to_string()]));

        let articles = vec![
            article("a", text, "", &["army"], 1),
            article("b", text, "", &[], 0),
        ];
        let clusters = cluster(&articles, &ClusterOptions::default());
        assert!(clusters[0].common_keywords.is_empty());
    }

    #[test]
    fn test_threshold_controls_merging() {
        let articles = vec![
            article("a", "army winter drill begins", "", &[], 0),
            article("b", "army winter drill ends early", "", &[], 0),
        ];
        let strict = ClusterOptions {
            similarity_threshold: 0.99,
            ..ClusterOptions::default()
        };
        let loose = ClusterOptions {
            similarity_threshold: 0.1,
            ..ClusterOptions::default()
        };
        assert!(cluster(&articles, &strict).is_empty());
        assert_eq!(cluster(&articles, &loose).len(), 1);
    }

    #[test]
    fn test_average_linkage_distance() {
        let a = HashMap::from([(0, 1.0)]);
        let b = HashMap::from([(0, 0.8), (1, 0.6)]);
        let c = HashMap::from([(1, 1.0)]);
        assert!((cosine_distance(&a, &b) - 0.2).abs() < 1e-9);
        assert!((cosine_distance(&b, &c) - 0.4).abs() < 1e-9);
        assert!((cosine_distance(&a, &c) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_distance(&a, &HashMap::new()), 1.0);

        // a+b merge at 0.2; c then sits at (1.0 + 0.4) / 2 = 0.7 from the pair
        let groups = agglomerate(&[a.clone(), b.clone(), c.clone()], 0.5);
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
        let groups = agglomerate(&[a, b, c], 0.75);
        assert_eq!(groups, vec![vec![0, 1, 2]]);
    }
}
