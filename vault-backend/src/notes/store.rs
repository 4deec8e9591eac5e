//! NoteStore - read/write/search over the markdown files of one vault
//!
//! Every call scans the vault afresh. Unreadable files are skipped.

use chrono::{DateTime, Local};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::note::Note;
use super::{file_ops, frontmatter};
use crate::error::{Result, VaultError};
use crate::templates::TemplateManager;

const EXCERPT_LEAD: usize = 50;
const EXCERPT_LEN: usize = 200;

/// Search result from the note store
#[derive(Debug, Clone, Serialize)]
pub struct NoteSearchResult {
    pub path: String,
    pub filename: String,
    pub score: usize,
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilteredSearchResult {
    #[serde(flatten)]
    pub hit: NoteSearchResult,
    pub template: String,
    pub created: String,
}

/// Frontmatter filters, values lowercased. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Exact match on `template`
    pub template: Option<String>,
    /// Substring of `created`
    pub created: Option<String>,
    /// Substring of the space-joined tag list
    pub tags: Option<String>,
}

impl SearchFilters {
    /// Parse comma-separated `key:value` pairs
    pub fn parse(raw: &str) -> Self {
        let mut filters = Self::default();
        for item in raw.split(',') {
            let Some((key, value)) = item.trim().split_once(':') else {
                continue;
            };
            let value = Some(value.trim().to_lowercase());
            match key.trim() {
                "template" => filters.template = value,
                "created" => filters.created = value,
                "tags" => filters.tags = value,
                other => log::debug!("[NOTES] Ignoring unknown search filter '{}'", other),
            }
        }
        filters
    }

    pub fn matches(&self, note: &Note) -> bool {
        if let Some(template) = &self.template {
            let actual = note.metadata.get("template").map(|t| t.to_lowercase()).unwrap_or_default();
            if &actual != template {
                return false;
            }
        }
        if let Some(created) = &self.created {
            let actual = note.metadata.get("created").map(String::as_str).unwrap_or("");
            if !actual.contains(created.as_str()) {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            let joined = note.tags.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>().join(" ");
            if !joined.contains(tags.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteListing {
    pub path: String,
    pub name: String,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultStats {
    pub vault_path: String,
    pub total_notes: usize,
    pub total_words: usize,
    pub average_words: usize,
    pub top_tags: Vec<(String, usize)>,
}

pub struct NoteStore {
    vault_dir: PathBuf,
}

impl NoteStore {
    /// Open a store over an existing vault directory
    pub fn new(vault_dir: impl Into<PathBuf>) -> Result<Self> {
        let vault_dir = vault_dir.into();
        if !vault_dir.is_dir() {
            return Err(VaultError::VaultNotFound(vault_dir));
        }
        Ok(Self { vault_dir })
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    fn all_notes(&self) -> Result<Vec<PathBuf>> {
        file_ops::list_notes(&self.vault_dir)
            .map_err(|_| VaultError::VaultNotFound(self.vault_dir.clone()))
    }

    /// Read and parse one note (`.md` optional)
    pub fn read_note(&self, rel_path: &str) -> Result<Note> {
        let full_path = file_ops::note_path(&self.vault_dir, rel_path)?;
        if !full_path.is_file() {
            return Err(VaultError::NoteNotFound(rel_path.to_string()));
        }
        Note::load(&self.vault_dir, &full_path)
    }

    /// Create or overwrite a note. An existing note keeps its `created` value.
    pub fn write_note(&self, rel_path: &str, content: &str, tags: &str, title: &str) -> Result<String> {
        let full_path = file_ops::note_path(&self.vault_dir, rel_path)?;
        let now = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let created = if full_path.is_file() {
            file_ops::read_note(&full_path)
                .ok()
                .and_then(|existing| frontmatter::parse_note(&existing).frontmatter.created)
        } else {
            None
        };

        let fm = frontmatter::NoteFrontmatter {
            title: Some(title.trim().to_string()).filter(|t| !t.is_empty()),
            created: Some(created.unwrap_or_else(|| now.clone())),
            updated: Some(now),
            tags: frontmatter::parse_csv(tags),
            ..Default::default()
        };

        let full = format!("{}\n\n{}\n", frontmatter::generate_frontmatter(&fm), content.trim_end());
        file_ops::write_note(&full_path, &full)?;

        let rel = file_ops::relative_path(&self.vault_dir, &full_path)
            .unwrap_or_else(|| rel_path.to_string());
        log::info!("[NOTES] Saved {}", rel);
        Ok(rel)
    }

    /// Create a note from a named template
    pub fn create_structured_note(
        &self,
        templates: &TemplateManager,
        rel_path: &str,
        template: &str,
        project: &str,
        content: &str,
        tags: &str,
    ) -> Result<String> {
        if templates.get_template(template).is_none() {
            return Err(VaultError::UnknownTemplate {
                name: template.to_string(),
                available: templates.names(),
            });
        }

        let full_path = file_ops::note_path(&self.vault_dir, rel_path)?;
        let title = file_ops::stem_of(&full_path.to_string_lossy());
        let tag_list = frontmatter::parse_csv(tags);

        let mut tag_line = format!("#{}", template);
        for tag in &tag_list {
            tag_line.push_str(&format!(" #{}", tag));
        }

        let mut variables = HashMap::new();
        variables.insert("title".to_string(), title.clone());
        variables.insert(
            "project".to_string(),
            if project.is_empty() { "Untitled Project".to_string() } else { project.to_string() },
        );
        variables.insert(
            "content".to_string(),
            if content.is_empty() {
                "Content will be added here...".to_string()
            } else {
                content.to_string()
            },
        );
        variables.insert("tags".to_string(), tag_line);
        variables.insert(
            "backlinks".to_string(),
            "- [[Related Note 1]]\n- [[Related Note 2]]".to_string(),
        );

        let body = templates.fill_template(template, &variables)?;

        let fm = frontmatter::NoteFrontmatter {
            title: Some(title),
            created: Some(Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
            template: Some(template.to_string()),
            project: Some(project.to_string()),
            tags: tag_list,
            ..Default::default()
        };

        let full = format!("{}\n\n{}\n", frontmatter::generate_frontmatter(&fm), body);
        file_ops::write_note(&full_path, &full)?;

        Ok(file_ops::relative_path(&self.vault_dir, &full_path).unwrap_or_else(|| rel_path.to_string()))
    }

    /// Case-insensitive search: 10 points for a filename hit plus one per body occurrence
    pub fn search_notes(&self, query: &str, limit: usize) -> Result<Vec<NoteSearchResult>> {
        let hits = self.scored_notes(query, &SearchFilters::default())?;
        Ok(ranked(hits.into_iter().map(|(hit, _)| hit).collect(), limit))
    }

    /// `search_notes` restricted by frontmatter filters (`template:research,created:2024,tags:ai`)
    pub fn advanced_search(&self, query: &str, filters: &str, limit: usize) -> Result<Vec<FilteredSearchResult>> {
        let filters = SearchFilters::parse(filters);
        let mut results: Vec<FilteredSearchResult> = self
            .scored_notes(query, &filters)?
            .into_iter()
            .map(|(hit, note)| FilteredSearchResult {
                template: note.metadata.get("template").cloned().unwrap_or_else(|| "unknown".to_string()),
                created: note.metadata.get("created").cloned().unwrap_or_else(|| "unknown".to_string()),
                hit,
            })
            .collect();

        results.sort_by(|a, b| b.hit.score.cmp(&a.hit.score).then_with(|| a.hit.path.cmp(&b.hit.path)));
        results.truncate(limit.max(1));
        Ok(results)
    }

    fn scored_notes(&self, query: &str, filters: &SearchFilters) -> Result<Vec<(NoteSearchResult, Note)>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        let query_lower = query.to_lowercase();
        let Some(matcher) = literal_matcher(query) else {
            return Ok(vec![]);
        };

        let mut results = Vec::new();
        for file_path in self.all_notes()? {
            let Ok(note) = Note::load(&self.vault_dir, &file_path) else {
                continue;
            };
            if !filters.matches(&note) {
                continue;
            }
            let filename = note.stem();

            let mut score = 0;
            if filename.to_lowercase().contains(&query_lower) {
                score += 10;
            }
            score += matcher.find_iter(&note.body).count();

            if score > 0 {
                let hit = NoteSearchResult {
                    excerpt: excerpt(&note.body, &matcher),
                    path: note.path.clone(),
                    filename,
                    score,
                };
                results.push((hit, note));
            }
        }
        Ok(results)
    }

    /// List notes in `folder` (vault root when empty), sorted by path
    pub fn list_notes(&self, folder: &str, recursive: bool) -> Result<Vec<NoteListing>> {
        let dir = if folder.trim().is_empty() {
            self.vault_dir.clone()
        } else {
            let rel = Path::new(folder.trim());
            if rel.is_absolute() || rel.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
                return Err(VaultError::InvalidPath(folder.to_string()));
            }
            self.vault_dir.join(rel)
        };

        let files = match file_ops::list_notes_in(&dir, recursive) {
            Ok(files) => files,
            Err(_) => return Ok(vec![]),
        };

        Ok(files
            .into_iter()
            .filter_map(|p| {
                let rel = file_ops::relative_path(&self.vault_dir, &p)?;
                let modified = std::fs::metadata(&p)
                    .and_then(|m| m.modified())
                    .ok()
                    .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d").to_string());
                Some(NoteListing {
                    name: file_ops::stem_of(&rel),
                    path: rel,
                    modified,
                })
            })
            .collect())
    }

    /// Notes linking to `rel_path` via `[[stem]]`, `[[stem|alias]]` or `[text](stem.md)`
    pub fn get_backlinks(&self, rel_path: &str) -> Result<Vec<String>> {
        let target = file_ops::stem_of(rel_path.trim_end_matches(".md"));
        let target = if target.is_empty() { rel_path.to_string() } else { target };
        let escaped = regex::escape(&target);
        let (Some(wiki), Some(markdown)) = (
            case_insensitive(&format!(r"\[\[{}(\|.*?)?\]\]", escaped)),
            case_insensitive(&format!(r"\[.*?\]\({}\.md\)", escaped)),
        ) else {
            return Ok(vec![]);
        };

        let mut backlinks = Vec::new();
        for file_path in self.all_notes()? {
            let Ok(content) = file_ops::read_note(&file_path) else {
                continue;
            };
            if wiki.is_match(&content) || markdown.is_match(&content) {
                if let Some(rel) = file_ops::relative_path(&self.vault_dir, &file_path) {
                    backlinks.push(rel);
                }
            }
        }
        Ok(backlinks)
    }

    pub fn vault_stats(&self) -> Result<VaultStats> {
        let files = self.all_notes()?;
        let total_notes = files.len();
        let mut total_words = 0;
        let mut tag_counts: HashMap<String, usize> = HashMap::new();

        for file_path in &files {
            let Ok(note) = Note::load(&self.vault_dir, file_path) else {
                continue;
            };
            total_words += note.word_count;
            let unique: HashSet<&String> = note.tags.iter().collect();
            for tag in unique {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut top_tags: Vec<(String, usize)> = tag_counts.into_iter().collect();
        top_tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        top_tags.truncate(10);

        Ok(VaultStats {
            vault_path: self.vault_dir.display().to_string(),
            total_notes,
            total_words,
            average_words: if total_notes > 0 { total_words / total_notes } else { 0 },
            top_tags,
        })
    }
}

fn ranked(mut results: Vec<NoteSearchResult>, limit: usize) -> Vec<NoteSearchResult> {
    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    results.truncate(limit.max(1));
    results
}

fn case_insensitive(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern).case_insensitive(true).build().ok()
}

fn literal_matcher(query: &str) -> Option<Regex> {
    case_insensitive(&regex::escape(query))
}

/// Excerpt around the first match: 50 characters before, 200 after
fn excerpt(body: &str, matcher: &Regex) -> String {
    let Some(m) = matcher.find(body) else {
        let mut out: String = body.chars().take(EXCERPT_LEN).collect();
        if body.chars().count() > EXCERPT_LEN {
            out.push_str("...");
        }
        return out;
    };

    let start = body[..m.start()]
        .char_indices()
        .rev()
        .take(EXCERPT_LEAD)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(m.start());
    let end = body[m.start()..]
        .char_indices()
        .nth(EXCERPT_LEN)
        .map(|(i, _)| m.start() + i)
        .unwrap_or(body.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    out.push_str(&body[start..end]);
    if end < body.len() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, NoteStore) {
        let dir = tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let store = NoteStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_vault() {
        let dir = tempdir().unwrap();
        let result = NoteStore::new(dir.path().join("nope"));
        assert!(matches!(result, Err(VaultError::VaultNotFound(_))));
    }

    #[test]
    fn test_write_and_read_note() {
        let (_dir, store) = store_with(&[]);
        let path = store
            .write_note("projects/Alpha", "Alpha body text", "rust, notes", "Alpha Project")
            .unwrap();
        assert_eq!(path, "projects/Alpha.md");

        let note = store.read_note("projects/Alpha").unwrap();
        assert_eq!(note.title, "Alpha Project");
        assert_eq!(note.tags, vec!["rust", "notes"]);
        assert_eq!(note.body.trim(), "Alpha body text");
        assert!(note.metadata.contains_key("created"));
    }

    #[test]
    fn test_rewrite_preserves_created() {
        let (_dir, store) = store_with(&[(
            "keep.md",
            "---\ncreated: 2020-01-01T00:00:00\n---\nold body",
        )]);
        store.write_note("keep", "new body", "", "").unwrap();
        let note = store.read_note("keep.md").unwrap();
        assert_eq!(note.created, "2020-01-01T00:00:00");
        assert_eq!(note.body.trim(), "new body");
    }

    #[test]
    fn test_read_missing_note() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(store.read_note("ghost"), Err(VaultError::NoteNotFound(_))));
    }

    #[test]
    fn test_search_scores_filename_and_content() {
        let (_dir, store) = store_with(&[
            ("Rust Tips.md", "Borrowing rules."),
            ("other.md", "I like rust. RUST is great. rust!"),
            ("none.md", "Nothing relevant."),
        ]);

        let results = store.search_notes("rust", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, "Rust Tips.md");
        assert_eq!(results[0].score, 10);
        assert_eq!(results[1].path, "other.md");
        assert_eq!(results[1].score, 3);
        assert!(results[1].excerpt.starts_with("I like rust"));
    }

    #[test]
    fn test_search_filters_parse() {
        let filters = SearchFilters::parse("template:Research, created:2024 ,tags:AI,bogus:x,novalue");
        assert_eq!(
            filters,
            SearchFilters {
                template: Some("research".to_string()),
                created: Some("2024".to_string()),
                tags: Some("ai".to_string()),
            }
        );
        assert_eq!(SearchFilters::parse(""), SearchFilters::default());
    }

    #[test]
    fn test_advanced_search_applies_filters() {
        let (_dir, store) = store_with(&[
            (
                "paper.md",
                "---\ntemplate: research\ncreated: 2024-03-01\ntags: [ai, ml]\n---\nneural nets and more neural nets",
            ),
            (
                "old.md",
                "---\ntemplate: research\ncreated: 2023-05-01\ntags: [ai]\n---\nneural history",
            ),
            ("plain.md", "neural notes without metadata"),
        ]);

        let all = store.advanced_search("neural", "", 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].hit.path, "paper.md");
        let plain = all.iter().find(|r| r.hit.path == "plain.md").unwrap();
        assert_eq!(plain.template, "unknown");
        assert_eq!(plain.created, "unknown");

        let research = store.advanced_search("neural", "template:research", 10).unwrap();
        assert_eq!(research.len(), 2);

        let recent = store.advanced_search("neural", "template:research,created:2024", 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].hit.path, "paper.md");
        assert_eq!(recent[0].hit.score, 2);
        assert_eq!(recent[0].created, "2024-03-01");

        let tagged = store.advanced_search("neural", "tags:ml", 10).unwrap();
        assert_eq!(tagged.len(), 1);
        assert!(store.advanced_search("neural", "template:meeting", 10).unwrap().is_empty());
    }

    #[test]
    fn test_excerpt_markers() {
        let body = format!("{}needle{}", "a".repeat(80), "b".repeat(300));
        let matcher = literal_matcher("needle").unwrap();
        let ex = excerpt(&body, &matcher);
        assert!(ex.starts_with("..."));
        assert!(ex.ends_with("..."));
        assert!(ex.contains("needle"));
        assert_eq!(ex.chars().count(), 3 + EXCERPT_LEAD + EXCERPT_LEN + 3);
    }

    #[test]
    fn test_list_notes_folder() {
        let (_dir, store) = store_with(&[
            ("root.md", "x"),
            ("ideas/a.md", "x"),
            ("ideas/deep/b.md", "x"),
        ]);
        let all = store.list_notes("", true).unwrap();
        assert_eq!(all.len(), 3);
        let ideas = store.list_notes("ideas", false).unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].path, "ideas/a.md");
        assert_eq!(ideas[0].name, "a");
        assert!(store.list_notes("../x", true).is_err());
    }

    #[test]
    fn test_get_backlinks() {
        let (_dir, store) = store_with(&[
            ("Target.md", "I am the target"),
            ("a.md", "links to [[target]]"),
            ("b.md", "links to [[Target|alias]]"),
            ("c.md", "markdown [t](Target.md)"),
            ("d.md", "mentions Target without link"),
        ]);
        let links = store.get_backlinks("Target.md").unwrap();
        assert_eq!(links, vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_vault_stats() {
        let (_dir, store) = store_with(&[
            ("a.md", "---\ntags: [x, y]\n---\none two three"),
            ("b.md", "---\ntags: [x]\n---\nfour five"),
        ]);
        let stats = store.vault_stats().unwrap();
        assert_eq!(stats.total_notes, 2);
        assert_eq!(stats.total_words, 5);
        assert_eq!(stats.average_words, 2);
        assert_eq!(stats.top_tags[0], ("x".to_string(), 2));
    }

    #[test]
    fn test_create_structured_note() {
        let (_dir, store) = store_with(&[]);
        let templates = TemplateManager::new();
        let path = store
            .create_structured_note(&templates, "research/Transformers", "research", "NLP", "", "ml, attention")
            .unwrap();
        assert_eq!(path, "research/Transformers.md");

        let note = store.read_note(&path).unwrap();
        assert_eq!(note.title, "Transformers");
        assert_eq!(note.metadata.get("template").map(String::as_str), Some("research"));
        assert!(note.body.contains("**Project**: NLP"));
        assert!(note.body.contains("#research #ml #attention"));
        assert!(note.body.contains("Content will be added here..."));

        let err = store
            .create_structured_note(&templates, "x", "missing", "", "", "")
            .unwrap_err();
        assert!(matches!(err, VaultError::UnknownTemplate { .. }));
    }
}
