//! JSON snapshot of a search run.
//!
//! Serializes the ranked article views together with the clusters so other
//! tools can pick up the results without scraping the text output.

use crate::models::{ArticleView, Cluster};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Everything one run produced.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Keywords that were searched.
    pub keywords: Vec<String>,
    /// Articles in rank order.
    pub articles: Vec<ArticleView>,
    /// Near-duplicate groups, largest first.
    pub clusters: Vec<Cluster>,
}

/// Write `snapshot` as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_snapshot(snapshot: &Snapshot, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).await?;
    info!(
        articles = snapshot.articles.len(),
        clusters = snapshot.clusters.len(),
        "Wrote JSON snapshot"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn snapshot() -> Snapshot {
        Snapshot {
            generated_at: DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            keywords: vec!["육군".to_string()],
            articles: vec![ArticleView {
                url: "https://example.com/a".to_string(),
                title: "육군 동계 훈련".to_string(),
                press: "연합뉴스".to_string(),
                canonical_url: "https://example.com/a".to_string(),
                published: "2026-10-18 21:03".to_string(),
                matched_keywords: vec!["육군".to_string()],
                cluster_id: Some(0),
                common_keywords: vec!["육군".to_string()],
            }],
            clusters: vec![Cluster {
                id: 0,
                members: vec!["https://example.com/a".to_string(), "https://example.com/b".to_string()],
                common_keywords: BTreeSet::from(["육군".to_string()]),
            }],
        }
    }

    #[test]
    fn test_snapshot_serialization() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains("\"generated_at\":\"2026-10-18T12:00:00Z\""));
        assert!(json.contains("연합뉴스"));
        assert!(json.contains("\"cluster_id\":0"));
    }

    #[tokio::test]
    async fn test_write_snapshot() {
        let path = std::env::temp_dir().join(format!("keyword_news_snapshot_{}.json", std::process::id()));
        let path = path.to_str().unwrap().to_string();

        write_snapshot(&snapshot(), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let back: Snapshot = serde_json::from_str(&written).unwrap();
        assert_eq!(back.articles, snapshot().articles);
        assert_eq!(back.clusters, snapshot().clusters);
        let _ = std::fs::remove_file(&path);
    }
}
