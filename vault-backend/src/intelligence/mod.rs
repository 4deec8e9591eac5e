//! Vault intelligence: similarity, duplicates, orphans, clusters and health
//!
//! `VaultIntelligence` is an immutable snapshot of one vault scan. Every
//! analysis reads from the same lexical index and backlink table.

pub mod graph;
pub mod health;
pub mod lexical;
pub mod session;
pub mod similarity;

use chrono::Local;
use std::collections::HashMap;
use std::path::Path;

use crate::config::defaults;
use crate::error::Result;

pub use graph::{BacklinkSuggestion, ClusterAnalysis, KnowledgeHub, OrphanNote, TagCluster};
pub use health::{HealthIssue, HealthReport, HealthScores};
pub use lexical::{IndexedNote, LexicalIndex};
pub use session::VaultSession;
pub use similarity::{DuplicatePair, NoteRef, SimilarNote};

pub struct VaultIntelligence {
    index: LexicalIndex,
    backlinks: HashMap<String, usize>,
}

impl VaultIntelligence {
    /// Scan the vault and build the analysis snapshot
    pub fn build(vault_dir: &Path) -> Result<Self> {
        Ok(Self::from_index(LexicalIndex::build(vault_dir)?))
    }

    pub fn from_index(index: LexicalIndex) -> Self {
        let backlinks = graph::backlink_counts(&index);
        Self { index, backlinks }
    }

    pub fn index(&self) -> &LexicalIndex {
        &self.index
    }

    pub fn backlink_count(&self, path: &str) -> usize {
        self.backlinks.get(path).copied().unwrap_or(0)
    }

    pub fn skipped_files(&self) -> usize {
        self.index.skipped_files()
    }

    pub fn find_similar_notes(&self, path: &str, threshold: f64, limit: usize) -> Vec<SimilarNote> {
        similarity::find_similar(&self.index, path, threshold, limit)
    }

    pub fn suggest_missing_backlinks(&self, path: &str) -> Vec<BacklinkSuggestion> {
        graph::suggest_missing_backlinks(&self.index, &self.backlinks, path)
    }

    pub fn detect_duplicate_content(&self, threshold: f64) -> Vec<DuplicatePair> {
        similarity::detect_duplicates(&self.index, threshold)
    }

    pub fn identify_orphaned_notes(&self) -> Vec<OrphanNote> {
        graph::find_orphans(&self.index, &self.backlinks)
    }

    pub fn analyze_knowledge_clusters(&self) -> ClusterAnalysis {
        graph::analyze_clusters(&self.index, &self.backlinks)
    }

    /// Health report using the default duplicate threshold
    pub fn get_vault_health_report(&self) -> HealthReport {
        health::compile_report(
            &self.index,
            &self.backlinks,
            self.identify_orphaned_notes(),
            self.detect_duplicate_content(defaults::DUPLICATE_THRESHOLD),
            Local::now(),
        )
    }
}
