//! Merges search results from every keyword into one article set.
//!
//! Each keyword is searched in turn. Records are normalized into
//! [`Article`]s keyed by URL; a URL surfaced by several queries is stored
//! once with the union of its keyword matches.

use crate::models::{Article, CandidateRecord};
use crate::press::extract_press;
use crate::sources::{NewsSource, fetch_or_empty};
use crate::utils::{count_occurrences, parse_publish_time, strip_markup};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Display name used when the publisher could not be determined.
pub const UNKNOWN_PRESS: &str = "unknown";

/// Search every keyword and merge the results.
///
/// Queries run strictly one after another with `pacing` between them.
/// A failed query contributes nothing; the run carries on.
#[instrument(level = "info", skip(source, keywords), fields(keyword_count = keywords.len()))]
pub async fn aggregate<S: NewsSource>(
    source: &S,
    keywords: &[String],
    pacing: Duration,
) -> BTreeMap<String, Article> {
    let batches: Vec<Vec<CandidateRecord>> = stream::iter(keywords.iter().enumerate())
        .then(|(i, keyword)| async move {
            if i > 0 && !pacing.is_zero() {
                sleep(pacing).await;
            }
            fetch_or_empty(source, keyword).await
        })
        .collect()
        .await;

    let mut articles = BTreeMap::new();
    for records in batches {
        merge_records(&mut articles, records, keywords);
    }

    info!(count = articles.len(), "Aggregated unique articles");
    articles
}

/// Normalize `records` and fold them into `articles`.
///
/// Keyword matches are computed against the full `keywords` list, not just
/// the keyword that produced the record. Records missing a title or link
/// are skipped.
pub fn merge_records(
    articles: &mut BTreeMap<String, Article>,
    records: Vec<CandidateRecord>,
    keywords: &[String],
) {
    for record in records {
        let Some(article) = normalize(record, keywords) else {
            continue;
        };
        match articles.get_mut(&article.url) {
            Some(existing) => existing.merge(article.matched_keywords, article.match_count),
            None => {
                articles.insert(article.url.clone(), article);
            }
        }
    }
}

/// Turn one candidate record into an article, or `None` if it is unusable.
pub fn normalize(record: CandidateRecord, keywords: &[String]) -> Option<Article> {
    let url = record.link.trim().to_string();
    let title = strip_markup(&record.title);
    if url.is_empty() || title.is_empty() {
        debug!(keyword = %record.keyword, %url, "Skipping record without title or link");
        return None;
    }
    let description = strip_markup(&record.description);

    let publish_time = parse_publish_time(&record.publish_date);
    if publish_time.is_none() {
        debug!(%url, publish_date = %record.publish_date, "Unparseable publish date");
    }

    let press_url = record
        .original_link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(&url);
    let press = extract_press(press_url);

    let text = format!("{title} {description}");
    let (matched_keywords, match_count) = match_keywords(&text, keywords);

    Some(Article {
        url,
        title,
        description,
        publish_time,
        source_domain: press.domain,
        source_name: press.name.unwrap_or_else(|| UNKNOWN_PRESS.to_string()),
        matched_keywords,
        match_count,
    })
}

/// Find which `keywords` occur in `text` and how often in total.
pub fn match_keywords(text: &str, keywords: &[String]) -> (BTreeSet<String>, usize) {
    let mut matched = BTreeSet::new();
    let mut total = 0;
    for keyword in keywords {
        let n = count_occurrences(text, keyword);
        if n > 0 {
            matched.insert(keyword.clone());
            total += n;
        }
    }
    (matched, total)
}
