use chrono::{DateTime, Duration, Local};
use serde::Serialize;
use std::collections::HashMap;

use super::graph::OrphanNote;
use super::lexical::LexicalIndex;
use super::similarity::DuplicatePair;

const RECENT_DAYS: i64 = 7;
const TOP_ORPHANS: usize = 5;
const TOP_DUPLICATES: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct HealthOverview {
    pub total_notes: usize,
    pub connectivity_ratio: f64,
    pub orphaned_notes: usize,
    pub duplicate_pairs: usize,
    pub recent_activity: usize,
    pub skipped_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScores {
    pub connectivity: u32,
    pub organization: u32,
    pub uniqueness: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthIssue {
    Orphan(OrphanNote),
    Duplicate(DuplicatePair),
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overview: HealthOverview,
    pub health_scores: HealthScores,
    pub recommendations: Vec<String>,
    pub top_issues: Vec<HealthIssue>,
}

/// 0-100 scores from raw counts. An empty vault scores 0/100/100.
pub fn health_scores(total: usize, linked: usize, orphans: usize, duplicates: usize) -> HealthScores {
    if total == 0 {
        return HealthScores {
            connectivity: 0,
            organization: 100,
            uniqueness: 100,
        };
    }
    let total = total as f64;
    let connectivity = (100.0 * linked as f64 / total).round().min(100.0);
    let organization = (100.0 - 100.0 * orphans as f64 / total).clamp(0.0, 100.0);
    let uniqueness = (100.0 - 200.0 * duplicates as f64 / total).clamp(0.0, 100.0);

    HealthScores {
        connectivity: connectivity as u32,
        organization: organization.round() as u32,
        uniqueness: uniqueness.round() as u32,
    }
}

pub fn recommendations(orphans: usize, duplicates: usize, connectivity_ratio: f64) -> Vec<String> {
    let mut out = Vec::new();
    if orphans > 0 {
        out.push(format!("Connect {} orphaned notes by adding relevant backlinks", orphans));
    }
    if duplicates > 0 {
        out.push(format!("Review {} pairs of similar notes for potential merging", duplicates));
    }
    if connectivity_ratio < 0.3 {
        out.push("Improve note connectivity by adding more cross-references".to_string());
    }
    if connectivity_ratio > 0.8 {
        out.push("Great connectivity! Consider organizing highly connected notes into MOCs".to_string());
    }
    out
}

pub fn compile_report(
    index: &LexicalIndex,
    backlinks: &HashMap<String, usize>,
    orphans: Vec<OrphanNote>,
    duplicates: Vec<DuplicatePair>,
    now: DateTime<Local>,
) -> HealthReport {
    let total = index.len();
    let linked = backlinks.values().filter(|&&c| c > 0).count();
    let connectivity_ratio = if total > 0 { linked as f64 / total as f64 } else { 0.0 };

    let cutoff = now - Duration::days(RECENT_DAYS);
    let recent_activity = index.iter().filter(|n| n.modified > cutoff).count();

    let overview = HealthOverview {
        total_notes: total,
        connectivity_ratio,
        orphaned_notes: orphans.len(),
        duplicate_pairs: duplicates.len(),
        recent_activity,
        skipped_files: index.skipped_files(),
    };

    let top_issues = orphans
        .iter()
        .take(TOP_ORPHANS)
        .cloned()
        .map(HealthIssue::Orphan)
        .chain(duplicates.iter().take(TOP_DUPLICATES).cloned().map(HealthIssue::Duplicate))
        .collect();

    HealthReport {
        health_scores: health_scores(total, linked, orphans.len(), duplicates.len()),
        recommendations: recommendations(orphans.len(), duplicates.len(), connectivity_ratio),
        overview,
        top_issues,
    }
}
