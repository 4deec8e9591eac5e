use serde::{Deserialize, Serialize};

/// A named concept remembered across conversations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub importance_score: f64,
    pub first_mentioned: String,
    pub last_accessed: String,
    pub access_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRelationship {
    /// Both concept names, in stored order
    pub concepts: [String; 2],
    pub relationship_type: String,
    pub strength: f64,
    pub context: Option<String>,
    pub created_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationInsight {
    pub content: String,
    pub insight_type: String,
    pub importance_score: f64,
    pub created_date: String,
    pub conversation_id: String,
}

/// Everything remembered about one concept
#[derive(Debug, Clone, Serialize)]
pub struct ConceptHistory {
    pub concept: Concept,
    pub relationships: Vec<ConceptRelationship>,
    pub recent_insights: Vec<ConversationInsight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgottenConnection {
    pub forgotten_concept: String,
    pub relationship_to: String,
    pub relationship_type: String,
    pub strength: f64,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopConcept {
    pub name: String,
    pub importance: f64,
    pub access_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeSummary {
    pub total_concepts: i64,
    pub total_relationships: i64,
    pub total_insights: i64,
    pub top_concepts: Vec<TopConcept>,
}
