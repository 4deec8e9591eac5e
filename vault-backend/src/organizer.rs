//! Knowledge organizer - keyword categorization, tag hierarchy and task tracking

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::error::{Result, VaultError};
use crate::notes::{file_ops, frontmatter};

/// Checked in order; the first group with a keyword in the content wins
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Research", &["research", "study", "experiment", "hypothesis", "methodology"]),
    ("Projects", &["project", "milestone", "deliverable", "timeline"]),
    ("Meetings", &["meeting", "agenda", "attendees", "discussion"]),
    ("Ideas", &["idea", "concept", "brainstorm", "innovation"]),
    ("Tasks", &["task", "to do", "checklist", "[ ]", "action item"]),
    ("Learning", &["learn", "course", "tutorial", "education", "book"]),
    ("References", &["reference", "bibliography", "citation", "source"]),
    ("Journal", &["daily", "weekly", "journal", "reflection", "today"]),
];
const TEMPLATES_CATEGORY: &str = "Templates";
const OTHER_CATEGORY: &str = "Other";

static CHECKBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*] \[([ xX])\][ \t]*(.+)$").unwrap());
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+(.+)$").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Checkbox,
    Numbered,
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub text: String,
    pub completed: bool,
    pub source_note: String,
    pub source_title: String,
    pub kind: TaskKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteProgress {
    pub path: String,
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    pub by_note: Vec<NoteProgress>,
}

pub struct KnowledgeOrganizer {
    vault_dir: PathBuf,
}

impl KnowledgeOrganizer {
    pub fn new(vault_dir: impl Into<PathBuf>) -> Result<Self> {
        let vault_dir = vault_dir.into();
        if !vault_dir.is_dir() {
            return Err(VaultError::VaultNotFound(vault_dir));
        }
        Ok(Self { vault_dir })
    }

    /// (relative path, content) for every note; content is None when unreadable
    fn scan(&self) -> Result<Vec<(String, Option<String>)>> {
        let files = file_ops::list_notes(&self.vault_dir)
            .map_err(|_| VaultError::VaultNotFound(self.vault_dir.clone()))?;
        Ok(files
            .iter()
            .filter_map(|path| {
                let rel = file_ops::relative_path(&self.vault_dir, path)?;
                Some((rel, file_ops::read_note(path).ok()))
            })
            .collect())
    }

    /// Every category in fixed order, empty ones included
    pub fn categorize_notes_by_content(&self) -> Result<Vec<CategoryGroup>> {
        let mut groups: Vec<CategoryGroup> = CATEGORY_KEYWORDS
            .iter()
            .map(|(name, _)| *name)
            .chain([TEMPLATES_CATEGORY, OTHER_CATEGORY])
            .map(|name| CategoryGroup {
                category: name.to_string(),
                notes: Vec::new(),
            })
            .collect();

        for (rel, content) in self.scan()? {
            let category = match content {
                Some(content) => categorize(&rel, &content),
                None => OTHER_CATEGORY,
            };
            if let Some(group) = groups.iter_mut().find(|g| g.category == category) {
                group.notes.push(rel);
            }
        }
        Ok(groups)
    }

    /// Tag to note paths, from inline `#tags` and frontmatter tags
    pub fn create_tag_hierarchy(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut hierarchy: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (rel, content) in self.scan()? {
            let Some(content) = content else {
                continue;
            };
            let parsed = frontmatter::parse_note(&content);
            let tags = parsed
                .frontmatter
                .tags
                .into_iter()
                .chain(frontmatter::extract_inline_tags(&parsed.body));
            for tag in tags {
                let paths = hierarchy.entry(tag).or_default();
                if !paths.contains(&rel) {
                    paths.push(rel.clone());
                }
            }
        }
        Ok(hierarchy)
    }

    pub fn extract_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for (rel, content) in self.scan()? {
            if let Some(content) = content {
                tasks.extend(tasks_in(&rel, &content));
            }
        }
        Ok(tasks)
    }

    pub fn progress_summary(&self) -> Result<ProgressSummary> {
        Ok(summarize(&self.extract_tasks()?))
    }
}

fn categorize(rel_path: &str, content: &str) -> &'static str {
    let lower = content.to_lowercase();
    for (name, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *name;
        }
    }
    if file_ops::stem_of(rel_path).to_lowercase().contains("template") || lower.contains("template") {
        return TEMPLATES_CATEGORY;
    }
    OTHER_CATEGORY
}

/// Checkbox tasks, then numbered items not already captured as checkboxes
pub fn tasks_in(rel_path: &str, content: &str) -> Vec<Task> {
    let title = file_ops::stem_of(rel_path);
    let mut tasks: Vec<Task> = CHECKBOX_RE
        .captures_iter(content)
        .map(|cap| Task {
            text: cap[2].trim().to_string(),
            completed: !cap[1].trim().is_empty(),
            source_note: rel_path.to_string(),
            source_title: title.clone(),
            kind: TaskKind::Checkbox,
        })
        .collect();

    for cap in NUMBERED_RE.captures_iter(content) {
        let text = cap[1].trim().to_string();
        if !tasks.iter().any(|t| t.text == text) {
            tasks.push(Task {
                text,
                completed: false,
                source_note: rel_path.to_string(),
                source_title: title.clone(),
                kind: TaskKind::Numbered,
            });
        }
    }
    tasks
}

fn rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

pub fn summarize(tasks: &[Task]) -> ProgressSummary {
    let mut by_note: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for task in tasks {
        let entry = by_note.entry(task.source_note.as_str()).or_default();
        entry.0 += 1;
        if task.completed {
            entry.1 += 1;
        }
    }

    let completed_tasks = tasks.iter().filter(|t| t.completed).count();
    ProgressSummary {
        total_tasks: tasks.len(),
        completed_tasks,
        completion_rate: rate(completed_tasks, tasks.len()),
        by_note: by_note
            .into_iter()
            .map(|(path, (total, completed))| NoteProgress {
                path: path.to_string(),
                total,
                completed,
                completion_rate: rate(completed, total),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_categorize_first_match_wins() {
        assert_eq!(categorize("a.md", "A study on project timelines"), "Research");
        assert_eq!(categorize("a.md", "Project milestone review"), "Projects");
        assert_eq!(categorize("My Template.md", "blank"), "Templates");
        assert_eq!(categorize("x.md", "nothing here"), "Other");
    }

    #[test]
    fn test_categorize_vault() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("m.md"), "Meeting agenda").unwrap();
        fs::write(dir.path().join("bad.md"), [0xff, 0xfe]).unwrap();

        let organizer = KnowledgeOrganizer::new(dir.path()).unwrap();
        let groups = organizer.categorize_notes_by_content().unwrap();
        assert_eq!(groups.len(), 10);
        assert_eq!(groups[0].category, "Research");
        let meetings = groups.iter().find(|g| g.category == "Meetings").unwrap();
        assert_eq!(meetings.notes, vec!["m.md"]);
        let other = groups.iter().find(|g| g.category == "Other").unwrap();
        assert_eq!(other.notes, vec!["bad.md"]);
    }

    #[test]
    fn test_tag_hierarchy() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "---\ntags: [rust, cli]\n---\nText #rust #async").unwrap();
        fs::write(dir.path().join("b.md"), "More #async").unwrap();

        let organizer = KnowledgeOrganizer::new(dir.path()).unwrap();
        let hierarchy = organizer.create_tag_hierarchy().unwrap();
        assert_eq!(hierarchy["rust"], vec!["a.md"]);
        assert_eq!(hierarchy["async"], vec!["a.md", "b.md"]);
        assert_eq!(hierarchy["cli"], vec!["a.md"]);
    }

    #[test]
    fn test_tasks_and_progress() {
        let content = "- [ ] write docs\n- [x] ship it\n1. write docs\n2) review\nnot 3. a task";
        let tasks = tasks_in("plan.md", content);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].text, "ship it");
        assert!(tasks[1].completed);
        assert_eq!(tasks[2].text, "review");
        assert_eq!(tasks[2].kind, TaskKind::Numbered);

        let summary = summarize(&tasks);
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.completed_tasks, 1);
        assert!((summary.completion_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.by_note[0].path, "plan.md");

        assert_eq!(summarize(&[]).completion_rate, 0.0);
    }
}
