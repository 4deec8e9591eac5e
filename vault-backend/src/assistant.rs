//! Proactive review - knowledge gaps and a review schedule
//!
//! Reads the concept memory and, when available, the vault intelligence
//! snapshot. Nothing here writes to either.

use serde::Serialize;

use crate::error::Result;
use crate::intelligence::VaultIntelligence;
use crate::memory::ConceptMemory;

/// Concepts accessed more often than this are expected to have insights
const SHALLOW_MIN_ACCESS: i64 = 5;
const HIGH_PRIORITY_ACCESS: i64 = 10;
const SHALLOW_MAX_INSIGHTS: usize = 3;
const GAP_HISTORY_DAYS: i64 = 90;
const ORPHAN_GAPS: usize = 5;
const MAX_GAPS: usize = 10;

const REVIEW_HISTORY_DAYS: i64 = 30;
const REVIEW_MIN_IMPORTANCE: f64 = 0.5;
const MAX_REVIEWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    ShallowExploration,
    DisconnectedKnowledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeGap {
    pub concept: String,
    pub gap_type: GapType,
    pub description: String,
    pub suggestion: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSuggestion {
    pub concept: String,
    pub importance: f64,
    pub last_accessed: String,
    pub suggestion: String,
    pub review_priority: f64,
}

/// Frequently accessed concepts with few recent insights, then the first
/// orphaned notes. At most 10 entries.
pub fn identify_knowledge_gaps(
    memory: &ConceptMemory,
    intelligence: Option<&VaultIntelligence>,
) -> Result<Vec<KnowledgeGap>> {
    let mut gaps = Vec::new();

    for top in memory.get_knowledge_summary()?.top_concepts {
        if top.access_count <= SHALLOW_MIN_ACCESS {
            continue;
        }
        let insights = memory
            .recall_concept_history(&top.name, GAP_HISTORY_DAYS)?
            .map(|h| h.recent_insights.len())
            .unwrap_or(0);
        if insights < SHALLOW_MAX_INSIGHTS {
            gaps.push(KnowledgeGap {
                description: format!("'{}' is frequently mentioned but rarely explored in depth", top.name),
                suggestion: format!("Consider creating a dedicated deep-dive note on {}", top.name),
                priority: if top.access_count > HIGH_PRIORITY_ACCESS {
                    Priority::High
                } else {
                    Priority::Medium
                },
                gap_type: GapType::ShallowExploration,
                concept: top.name,
            });
        }
    }

    if let Some(intelligence) = intelligence {
        for orphan in intelligence.identify_orphaned_notes().into_iter().take(ORPHAN_GAPS) {
            gaps.push(KnowledgeGap {
                description: format!(
                    "Note '{}' exists but isn't connected to your knowledge network",
                    orphan.title
                ),
                suggestion: format!("Review and connect '{}' to related notes", orphan.title),
                priority: Priority::Medium,
                gap_type: GapType::DisconnectedKnowledge,
                concept: orphan.title,
            });
        }
    }

    gaps.truncate(MAX_GAPS);
    log::debug!("[MEMORY] Found {} knowledge gaps", gaps.len());
    Ok(gaps)
}

/// Important top concepts to revisit, highest review priority first. At most 8 entries.
pub fn suggest_review_schedule(memory: &ConceptMemory) -> Result<Vec<ReviewSuggestion>> {
    let mut suggestions = Vec::new();

    for top in memory.get_knowledge_summary()?.top_concepts {
        let Some(history) = memory.recall_concept_history(&top.name, REVIEW_HISTORY_DAYS)? else {
            continue;
        };
        let importance = history.concept.importance_score;
        if importance <= REVIEW_MIN_IMPORTANCE {
            continue;
        }
        suggestions.push(ReviewSuggestion {
            suggestion: format!(
                "Review notes about '{}' - it's important but hasn't been accessed recently",
                top.name
            ),
            concept: top.name,
            importance,
            last_accessed: history.concept.last_accessed,
            review_priority: importance * 0.7 + 0.3,
        });
    }

    suggestions.sort_by(|a, b| b.review_priority.total_cmp(&a.review_priority));
    suggestions.truncate(MAX_REVIEWS);
    Ok(suggestions)
}
