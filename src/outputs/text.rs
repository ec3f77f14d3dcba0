//! Plain-text clipping list for the selected articles.
//!
//! Two layouts are supported:
//!
//! - **Flat**: every selected article in rank order as a `■` entry
//! - **Grouped**: one block per cluster, headed by the cluster's common
//!   keywords with `-` entries, followed by the unclustered articles as `■`
//!   entries
//!
//! Entries and blocks are separated by exactly one blank line and the text
//! never ends with a separator.

use crate::models::{ArticleView, Cluster};
use crate::present::Selection;
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header used for clusters whose members share no keyword.
pub const RELATED_HEADER: &str = "관련 기사";

/// Layout of the exported text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// One `■` entry per article.
    #[default]
    Flat,
    /// Articles grouped under their cluster's keywords.
    Grouped,
}

/// Render the selected articles as a single text blob.
///
/// `views` must be in rank order; `clusters` in cluster order. Articles not
/// in `selection` are left out, as are clusters with no selected member.
pub fn export(
    views: &[ArticleView],
    clusters: &[Cluster],
    selection: &Selection,
    format: ExportFormat,
) -> String {
    let selected = views.iter().filter(|v| selection.contains(&v.url));
    match format {
        ExportFormat::Flat => selected.map(|v| entry('■', v)).join("\n\n"),
        ExportFormat::Grouped => grouped(views, clusters, selection),
    }
}

/// The line copied for a single article.
pub fn copy_line(view: &ArticleView) -> String {
    format!("[{}] {}\n{}", view.press, view.title, view.canonical_url)
}

fn entry(bullet: char, view: &ArticleView) -> String {
    format!("{} {} ({})\n{}", bullet, view.title, view.press, view.canonical_url)
}

fn header(cluster: &Cluster) -> String {
    if cluster.common_keywords.is_empty() {
        format!("[{RELATED_HEADER}]")
    } else {
        format!("[{}]", cluster.common_keywords.iter().join(", "))
    }
}

fn grouped(views: &[ArticleView], clusters: &[Cluster], selection: &Selection) -> String {
    let by_url: HashMap<&str, &ArticleView> = views.iter().map(|v| (v.url.as_str(), v)).collect();
    let mut blocks = Vec::new();

    for cluster in clusters {
        let members: Vec<String> = cluster
            .members
            .iter()
            .filter(|url| selection.contains(url))
            .filter_map(|url| by_url.get(url.as_str()))
            .map(|v| entry('-', v))
            .collect();
        if members.is_empty() {
            continue;
        }
        blocks.push(format!("{}\n{}", header(cluster), members.join("\n\n")));
    }

    blocks.extend(
        views
            .iter()
            .filter(|v| selection.contains(&v.url))
            .filter(|v| !clusters.iter().any(|c| c.contains(&v.url)))
            .map(|v| entry('■', v)),
    );

    blocks.join("\n\n")
}
