//! ConceptMemory - SQLite-backed concept, relationship and insight storage
//!
//! Lives at `<vault>/.obsidian_mcp/memory.db`. Timestamps are stored as
//! RFC 3339 UTC strings with microsecond precision so they sort lexically.

use chrono::{Duration, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use std::path::Path;

use super::concepts::extract_concepts;
use super::models::{
    Concept, ConceptHistory, ConceptRelationship, ConversationInsight, ForgottenConnection,
    KnowledgeSummary, TopConcept,
};
use crate::error::Result;

const CO_MENTION_TYPE: &str = "co-mentioned";
const CO_MENTION_STRENGTH: f64 = 0.3;
const FORGOTTEN_MIN_STRENGTH: f64 = 0.5;

pub struct ConceptMemory {
    conn: Mutex<Connection>,
}

fn now_str() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl ConceptMemory {
    /// Open (or create) the memory database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS concepts (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                description TEXT,
                category TEXT,
                importance_score REAL DEFAULT 1.0,
                first_mentioned TEXT,
                last_accessed TEXT,
                access_count INTEGER DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS concept_relationships (
                id INTEGER PRIMARY KEY,
                concept1_id INTEGER REFERENCES concepts (id),
                concept2_id INTEGER REFERENCES concepts (id),
                relationship_type TEXT,
                strength REAL,
                context TEXT,
                created_date TEXT,
                last_accessed TEXT
            );
            CREATE TABLE IF NOT EXISTS conversation_insights (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                concepts TEXT,
                insight_type TEXT,
                importance_score REAL,
                created_date TEXT,
                conversation_id TEXT
            );",
        )?;
        log::info!("[MEMORY] Opened concept memory at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a concept or bump its access count. Returns the concept id.
    pub fn store_concept(&self, name: &str, description: &str, category: &str) -> Result<i64> {
        let conn = self.conn.lock();
        Self::upsert_concept(&conn, name, description, category)
    }

    fn upsert_concept(conn: &Connection, name: &str, description: &str, category: &str) -> Result<i64> {
        let now = now_str();
        let existing: Option<i64> = conn
            .query_row("SELECT id FROM concepts WHERE name = ?1", [name], |row| row.get(0))
            .optional()?;

        if let Some(id) = existing {
            conn.execute(
                "UPDATE concepts SET last_accessed = ?1, access_count = access_count + 1,
                 description = CASE WHEN ?2 = '' THEN description ELSE ?2 END
                 WHERE id = ?3",
                params![now, description, id],
            )?;
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO concepts (name, description, category, first_mentioned, last_accessed)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![name, description, category, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Relate two concepts. Returns false when both names are the same concept.
    pub fn store_relationship(
        &self,
        concept1: &str,
        concept2: &str,
        relationship_type: &str,
        strength: f64,
        context: &str,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        Self::upsert_relationship(&conn, concept1, concept2, relationship_type, strength, context)
    }

    fn upsert_relationship(
        conn: &Connection,
        concept1: &str,
        concept2: &str,
        relationship_type: &str,
        strength: f64,
        context: &str,
    ) -> Result<bool> {
        let id1 = Self::upsert_concept(conn, concept1, "", "")?;
        let id2 = Self::upsert_concept(conn, concept2, "", "")?;
        if id1 == id2 {
            return Ok(false);
        }

        let now = now_str();
        let existing: Option<(i64, f64)> = conn
            .query_row(
                "SELECT id, strength FROM concept_relationships
                 WHERE (concept1_id = ?1 AND concept2_id = ?2)
                    OR (concept1_id = ?2 AND concept2_id = ?1)",
                params![id1, id2],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((rel_id, old_strength)) => {
                let new_strength = ((old_strength + strength) / 2.0).min(1.0);
                conn.execute(
                    "UPDATE concept_relationships SET strength = ?1, context = ?2, last_accessed = ?3
                     WHERE id = ?4",
                    params![new_strength, context, now, rel_id],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO concept_relationships
                     (concept1_id, concept2_id, relationship_type, strength, context, created_date, last_accessed)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    params![id1, id2, relationship_type, strength, context, now],
                )?;
            }
        }
        Ok(true)
    }

    /// Store an insight, its concepts and their co-mention relationships.
    /// Returns the conversation id used.
    pub fn store_conversation_insight(
        &self,
        content: &str,
        insight_type: &str,
        importance_score: f64,
        conversation_id: Option<&str>,
    ) -> Result<String> {
        let conversation_id = match conversation_id {
            Some(id) => id.to_string(),
            None => generate_conversation_id(&now_str(), content),
        };
        let concepts = extract_concepts(content);

        let conn = self.conn.lock();
        for concept in &concepts {
            Self::upsert_concept(&conn, concept, "", "")?;
        }
        let context = format!("Discussed together in conversation {}", conversation_id);
        for (i, a) in concepts.iter().enumerate() {
            for b in &concepts[i + 1..] {
                Self::upsert_relationship(&conn, a, b, CO_MENTION_TYPE, CO_MENTION_STRENGTH, &context)?;
            }
        }

        conn.execute(
            "INSERT INTO conversation_insights
             (content, concepts, insight_type, importance_score, created_date, conversation_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                content,
                serde_json::to_string(&concepts)?,
                insight_type,
                importance_score,
                now_str(),
                conversation_id
            ],
        )?;

        log::debug!(
            "[MEMORY] Stored insight {} with {} concepts",
            conversation_id,
            concepts.len()
        );
        Ok(conversation_id)
    }

    /// Concept matching `name` (substring, exact match preferred) with its
    /// relationships and the insights of the last `days_back` days
    pub fn recall_concept_history(&self, name: &str, days_back: i64) -> Result<Option<ConceptHistory>> {
        let conn = self.conn.lock();
        let pattern = format!("%{}%", name);

        let concept = conn
            .query_row(
                "SELECT id, name, description, category, importance_score, first_mentioned,
                        last_accessed, access_count
                 FROM concepts WHERE name LIKE ?1
                 ORDER BY (lower(name) = lower(?2)) DESC, id
                 LIMIT 1",
                params![pattern, name],
                Self::row_to_concept,
            )
            .optional()?;
        let Some(concept) = concept else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT c1.name, c2.name, cr.relationship_type, cr.strength, cr.context, cr.created_date
             FROM concept_relationships cr
             JOIN concepts c1 ON cr.concept1_id = c1.id
             JOIN concepts c2 ON cr.concept2_id = c2.id
             WHERE cr.concept1_id = ?1 OR cr.concept2_id = ?1
             ORDER BY cr.strength DESC, cr.created_date DESC",
        )?;
        let relationships = stmt
            .query_map([concept.id], Self::row_to_relationship)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let cutoff = (Utc::now() - Duration::days(days_back)).to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut stmt = conn.prepare(
            "SELECT content, insight_type, importance_score, created_date, conversation_id
             FROM conversation_insights
             WHERE concepts LIKE ?1 AND created_date >= ?2
             ORDER BY importance_score DESC, created_date DESC",
        )?;
        let recent_insights = stmt
            .query_map(params![pattern, cutoff], Self::row_to_insight)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(ConceptHistory {
            concept,
            relationships,
            recent_insights,
        }))
    }

    /// Strongly related concepts not already in `current`, strongest first
    pub fn suggest_forgotten_connections(&self, current: &[String]) -> Result<Vec<ForgottenConnection>> {
        let conn = self.conn.lock();
        let current_lower: Vec<String> = current.iter().map(|c| c.to_lowercase()).collect();

        let mut stmt = conn.prepare(
            "SELECT CASE WHEN c1.name LIKE ?1 THEN c2.name ELSE c1.name END,
                    cr.relationship_type, cr.strength, cr.context
             FROM concept_relationships cr
             JOIN concepts c1 ON cr.concept1_id = c1.id
             JOIN concepts c2 ON cr.concept2_id = c2.id
             WHERE (c1.name LIKE ?1 OR c2.name LIKE ?1) AND cr.strength > ?2
             ORDER BY cr.strength DESC
             LIMIT 5",
        )?;

        let mut suggestions = Vec::new();
        for concept in current {
            let pattern = format!("%{}%", concept);
            let rows = stmt.query_map(params![pattern, FORGOTTEN_MIN_STRENGTH], |row| {
                Ok(ForgottenConnection {
                    forgotten_concept: row.get(0)?,
                    relationship_to: concept.clone(),
                    relationship_type: row.get(1)?,
                    strength: row.get(2)?,
                    context: row.get(3)?,
                })
            })?;
            for suggestion in rows {
                let suggestion = suggestion?;
                if !current_lower.contains(&suggestion.forgotten_concept.to_lowercase()) {
                    suggestions.push(suggestion);
                }
            }
        }

        suggestions.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        suggestions.truncate(10);
        Ok(suggestions)
    }

    pub fn get_knowledge_summary(&self) -> Result<KnowledgeSummary> {
        let conn = self.conn.lock();
        let count = |table: &str| -> rusqlite::Result<i64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        };
        let total_concepts = count("concepts")?;
        let total_relationships = count("concept_relationships")?;
        let total_insights = count("conversation_insights")?;

        let mut stmt = conn.prepare(
            "SELECT name, importance_score, access_count FROM concepts
             ORDER BY importance_score * access_count DESC, name
             LIMIT 10",
        )?;
        let top_concepts = stmt
            .query_map([], |row| {
                Ok(TopConcept {
                    name: row.get(0)?,
                    importance: row.get(1)?,
                    access_count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(KnowledgeSummary {
            total_concepts,
            total_relationships,
            total_insights,
            top_concepts,
        })
    }

    fn row_to_concept(row: &rusqlite::Row) -> rusqlite::Result<Concept> {
        Ok(Concept {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get::<_, Option<String>>(2)?.filter(|d| !d.is_empty()),
            category: row.get::<_, Option<String>>(3)?.filter(|c| !c.is_empty()),
            importance_score: row.get(4)?,
            first_mentioned: row.get(5)?,
            last_accessed: row.get(6)?,
            access_count: row.get(7)?,
        })
    }

    fn row_to_relationship(row: &rusqlite::Row) -> rusqlite::Result<ConceptRelationship> {
        Ok(ConceptRelationship {
            concepts: [row.get(0)?, row.get(1)?],
            relationship_type: row.get(2)?,
            strength: row.get(3)?,
            context: row.get(4)?,
            created_date: row.get(5)?,
        })
    }

    fn row_to_insight(row: &rusqlite::Row) -> rusqlite::Result<ConversationInsight> {
        Ok(ConversationInsight {
            content: row.get(0)?,
            insight_type: row.get(1)?,
            importance_score: row.get(2)?,
            created_date: row.get(3)?,
            conversation_id: row.get(4)?,
        })
    }
}

/// First 12 hex chars of SHA-256 over the timestamp and the first 100 chars of content
pub fn generate_conversation_id(timestamp: &str, content: &str) -> String {
    let prefix: String = content.chars().take(100).collect();
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(prefix.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(12);
    id
}
