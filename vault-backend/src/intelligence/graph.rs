//! Link-graph analyses: backlinks, orphans, tag clusters, hubs and
//! missing-backlink suggestions.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::lexical::LexicalIndex;
use super::similarity::common_tags;

pub const ORPHAN_SUGGESTION: &str = "Consider linking to related notes or adding relevant tags";
const MIN_CLUSTER_SIZE: usize = 3;
const MIN_HUB_CONNECTIONS: usize = 5;
const MAX_HUBS: usize = 10;
const MAX_BACKLINK_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct OrphanNote {
    pub path: String,
    pub title: String,
    pub word_count: usize,
    pub created: String,
    pub outgoing_links: usize,
    pub tags: Vec<String>,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagCluster {
    pub note_count: usize,
    pub notes: Vec<String>,
    pub avg_word_count: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeHub {
    pub path: String,
    pub title: String,
    pub backlinks: usize,
    pub outgoing_links: usize,
    pub total_connections: usize,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterAnalysis {
    pub tag_clusters: BTreeMap<String, TagCluster>,
    pub knowledge_hubs: Vec<KnowledgeHub>,
    pub total_notes: usize,
    pub total_links: usize,
    pub avg_backlinks: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacklinkSuggestion {
    pub target_path: String,
    pub title: String,
    pub relevance: f64,
    pub reason: String,
    pub backlink_count: usize,
    pub common_tags: Vec<String>,
}

/// Inbound resolved-link count for every indexed note (zero included)
pub fn backlink_counts(index: &LexicalIndex) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = index.iter().map(|n| (n.path.clone(), 0)).collect();
    for note in index.iter() {
        for target in &note.resolved_links {
            if let Some(count) = counts.get_mut(target) {
                *count += 1;
            }
        }
    }
    counts
}

/// Notes without backlinks and with at most one outgoing link, longest first
pub fn find_orphans(index: &LexicalIndex, backlinks: &HashMap<String, usize>) -> Vec<OrphanNote> {
    let mut orphans: Vec<OrphanNote> = index
        .iter()
        .filter(|n| backlinks.get(&n.path).copied().unwrap_or(0) == 0 && n.outgoing_links.len() <= 1)
        .map(|n| OrphanNote {
            path: n.path.clone(),
            title: n.title.clone(),
            word_count: n.word_count,
            created: n.created.clone(),
            outgoing_links: n.outgoing_links.len(),
            tags: n.tags.clone(),
            suggestion: ORPHAN_SUGGESTION.to_string(),
        })
        .collect();

    orphans.sort_by(|a, b| b.word_count.cmp(&a.word_count).then_with(|| a.path.cmp(&b.path)));
    orphans
}

pub fn analyze_clusters(index: &LexicalIndex, backlinks: &HashMap<String, usize>) -> ClusterAnalysis {
    let mut by_tag: BTreeMap<String, Vec<(String, usize)>> = BTreeMap::new();
    for note in index.iter() {
        let mut seen: Vec<&String> = Vec::new();
        for tag in &note.tags {
            if seen.contains(&tag) {
                continue;
            }
            seen.push(tag);
            by_tag
                .entry(tag.clone())
                .or_default()
                .push((note.path.clone(), note.word_count));
        }
    }

    let tag_clusters = by_tag
        .into_iter()
        .filter(|(_, members)| members.len() >= MIN_CLUSTER_SIZE)
        .map(|(tag, members)| {
            let total_words: usize = members.iter().map(|(_, w)| w).sum();
            let cluster = TagCluster {
                note_count: members.len(),
                avg_word_count: total_words as f64 / members.len() as f64,
                notes: members.into_iter().map(|(p, _)| p).collect(),
            };
            (tag, cluster)
        })
        .collect();

    let mut hubs: Vec<KnowledgeHub> = index
        .iter()
        .filter_map(|n| {
            let inbound = backlinks.get(&n.path).copied().unwrap_or(0);
            let total = inbound + n.outgoing_links.len();
            (total >= MIN_HUB_CONNECTIONS).then(|| KnowledgeHub {
                path: n.path.clone(),
                title: n.title.clone(),
                backlinks: inbound,
                outgoing_links: n.outgoing_links.len(),
                total_connections: total,
                tags: n.tags.clone(),
            })
        })
        .collect();
    hubs.sort_by(|a, b| {
        b.total_connections
            .cmp(&a.total_connections)
            .then_with(|| a.path.cmp(&b.path))
    });
    hubs.truncate(MAX_HUBS);

    let total_notes = index.len();
    let total_backlinks: usize = backlinks.values().sum();
    ClusterAnalysis {
        tag_clusters,
        knowledge_hubs: hubs,
        total_notes,
        total_links: index.iter().map(|n| n.outgoing_links.len()).sum(),
        avg_backlinks: if total_notes > 0 {
            total_backlinks as f64 / total_notes as f64
        } else {
            0.0
        },
    }
}

/// Notes whose title appears in `path`'s body but which it does not link yet
pub fn suggest_missing_backlinks(
    index: &LexicalIndex,
    backlinks: &HashMap<String, usize>,
    path: &str,
) -> Vec<BacklinkSuggestion> {
    let Some(target) = index.get(path) else {
        return vec![];
    };
    let body = target.body.to_lowercase();
    let links: Vec<String> = target.outgoing_links.iter().map(|l| l.to_lowercase()).collect();

    let mut suggestions: Vec<BacklinkSuggestion> = index
        .iter()
        .filter(|other| other.path != target.path)
        .filter_map(|other| {
            let title = other.title.to_lowercase();
            let words: Vec<&str> = title.split_whitespace().collect();
            let title_in_content = !title.is_empty() && body.contains(&title);
            let partial = words
                .iter()
                .filter(|w| w.chars().count() > 3 && body.contains(*w))
                .count();

            let stem = crate::notes::file_ops::stem_of(&other.path).to_lowercase();
            let already_linked = links.iter().any(|l| l.contains(&stem));

            if !(title_in_content || partial >= 2) || already_linked {
                return None;
            }

            let mut relevance = partial as f64 / words.len().max(1) as f64;
            if title_in_content {
                relevance += 0.5;
            }
            let reason = if title_in_content {
                format!("Title '{}' mentioned in content", other.title)
            } else {
                format!("{} title words found in content", partial)
            };

            Some(BacklinkSuggestion {
                target_path: other.path.clone(),
                title: other.title.clone(),
                relevance,
                reason,
                backlink_count: backlinks.get(&other.path).copied().unwrap_or(0),
                common_tags: common_tags(&target.tags, &other.tags),
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then_with(|| a.target_path.cmp(&b.target_path))
    });
    suggestions.truncate(MAX_BACKLINK_SUGGESTIONS);
    suggestions
}
