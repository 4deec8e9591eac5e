//! Lexical index - term frequencies and resolved links for every note
//!
//! Built from a fresh scan of the vault. Files that cannot be read or are not
//! valid UTF-8, and folders the walk cannot enter, are skipped and counted in
//! `skipped_files`. A vault root that cannot be listed is fatal.

use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{Result, VaultError};
use crate::notes::{Note, file_ops, frontmatter};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Lowercased `\w+` runs longer than two characters
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| t.chars().count() > 2)
        .map(String::from)
        .collect()
}

pub fn term_frequency(text: &str) -> HashMap<String, u32> {
    let mut tf = HashMap::new();
    for token in tokenize(text) {
        *tf.entry(token).or_insert(0) += 1;
    }
    tf
}

/// One note with its lexical profile
#[derive(Debug, Clone, Serialize)]
pub struct IndexedNote {
    pub path: String,
    pub title: String,
    pub body: String,
    pub word_count: usize,
    pub tags: Vec<String>,
    pub created: String,
    pub modified: DateTime<Local>,
    #[serde(skip)]
    pub term_frequency: HashMap<String, u32>,
    /// Raw link targets in first-occurrence order
    pub outgoing_links: Vec<String>,
    /// Outgoing links resolved to note paths (self-links excluded)
    pub resolved_links: Vec<String>,
}

impl IndexedNote {
    fn from_note(note: Note) -> Self {
        Self {
            term_frequency: term_frequency(&note.body),
            outgoing_links: frontmatter::extract_links(&note.body),
            resolved_links: Vec::new(),
            path: note.path,
            title: note.title,
            word_count: note.word_count,
            tags: note.tags,
            created: note.created,
            modified: note.modified,
            body: note.body,
        }
    }
}

#[derive(Debug, Default)]
pub struct LexicalIndex {
    notes: BTreeMap<String, IndexedNote>,
    skipped_files: usize,
}

impl LexicalIndex {
    /// Scan every `.md` file under `vault_dir`
    pub fn build(vault_dir: &Path) -> Result<Self> {
        let scan = file_ops::scan_notes(vault_dir, true)
            .map_err(|_| VaultError::VaultNotFound(vault_dir.to_path_buf()))?;

        let mut notes = Vec::with_capacity(scan.files.len());
        let mut skipped = scan.unreadable;
        for file_path in &scan.files {
            match Note::load(vault_dir, file_path) {
                Ok(note) => notes.push(note),
                Err(e) => {
                    log::debug!("[VAULT] Skipping {}: {}", file_path.display(), e);
                    skipped += 1;
                }
            }
        }

        let mut index = Self::from_notes(notes);
        index.skipped_files = skipped;
        log::info!(
            "[VAULT] Indexed {} notes ({} skipped)",
            index.len(),
            index.skipped_files
        );
        Ok(index)
    }

    /// Index already-loaded notes and resolve their links
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let mut map: BTreeMap<String, IndexedNote> = notes
            .into_iter()
            .map(|n| (n.path.clone(), IndexedNote::from_note(n)))
            .collect();

        let paths: Vec<String> = map.keys().cloned().collect();
        for entry in map.values_mut() {
            let mut resolved = Vec::new();
            for link in &entry.outgoing_links {
                if let Some(target) = resolve(&paths, link) {
                    if target != entry.path && !resolved.contains(&target) {
                        resolved.push(target);
                    }
                }
            }
            entry.resolved_links = resolved;
        }

        Self {
            notes: map,
            skipped_files: 0,
        }
    }

    /// Resolve a raw link target to an indexed note path
    pub fn normalize_link(&self, link: &str) -> Option<String> {
        let paths: Vec<String> = self.notes.keys().cloned().collect();
        resolve(&paths, link)
    }

    pub fn get(&self, path: &str) -> Option<&IndexedNote> {
        self.notes.get(path)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn skipped_files(&self) -> usize {
        self.skipped_files
    }

    /// Notes in sorted path order
    pub fn iter(&self) -> impl Iterator<Item = &IndexedNote> {
        self.notes.values()
    }
}

/// First path (in sorted order) whose stem equals the target, or which equals `target.md`
fn resolve(sorted_paths: &[String], link: &str) -> Option<String> {
    let target = link.strip_suffix(".md").unwrap_or(link);
    let with_ext = format!("{}.md", target);
    sorted_paths
        .iter()
        .find(|p| file_ops::stem_of(p) == target || **p == with_ext)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn note(path: &str, body: &str) -> Note {
        let now = Local::now();
        Note::from_content(path, body, now, now)
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(
            tokenize("An AI is a big Machine-Learning idea, ok?"),
            vec!["big", "machine", "learning", "idea"]
        );
        let tf = term_frequency("rust Rust RUST go");
        assert_eq!(tf.get("rust"), Some(&3));
        assert!(!tf.contains_key("go"));
    }

    #[test]
    fn test_link_resolution() {
        let index = LexicalIndex::from_notes(vec![
            note("a.md", "see [[b]] and [[sub/c]] and [x](b.md) and [[missing]] and [[a]]"),
            note("b.md", "plain"),
            note("sub/c.md", "nested"),
        ]);

        let a = index.get("a.md").unwrap();
        assert_eq!(a.outgoing_links, vec!["b", "sub/c", "missing", "a", "b.md"]);
        assert_eq!(a.resolved_links, vec!["b.md", "sub/c.md"]);
        assert_eq!(index.normalize_link("c"), Some("sub/c.md".to_string()));
        assert_eq!(index.normalize_link("nope"), None);
    }

    #[test]
    fn test_stem_collision_picks_first_sorted_path() {
        let index = LexicalIndex::from_notes(vec![
            note("z/dup.md", ""),
            note("a/dup.md", ""),
            note("linker.md", "[[dup]]"),
        ]);
        assert_eq!(index.get("linker.md").unwrap().resolved_links, vec!["a/dup.md"]);
    }

    #[test]
    fn test_build_skips_invalid_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.md"), "hello world").unwrap();
        fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();
        fs::create_dir(dir.path().join(".obsidian_mcp")).unwrap();
        fs::write(dir.path().join(".obsidian_mcp/state.md"), "hidden").unwrap();

        let index = LexicalIndex::build(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped_files(), 1);
        assert!(index.get("good.md").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_build_counts_locked_folders() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "open note").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("b.md"), "hidden note").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let enforced = fs::read_dir(&locked).is_err();
        let index = LexicalIndex::build(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let index = index.unwrap();
        if enforced {
            assert_eq!(index.len(), 1);
            assert_eq!(index.skipped_files(), 1);
        } else {
            assert_eq!(index.len(), 2);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_build_unreadable_root() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let vault = dir.path().join("vault");
        fs::create_dir(&vault).unwrap();
        fs::write(vault.join("a.md"), "content").unwrap();

        fs::set_permissions(&vault, fs::Permissions::from_mode(0o000)).unwrap();
        let enforced = fs::read_dir(&vault).is_err();
        let result = LexicalIndex::build(&vault);
        fs::set_permissions(&vault, fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            assert!(matches!(result, Err(VaultError::VaultNotFound(_))));
        } else {
            assert_eq!(result.unwrap().len(), 1);
        }
    }

    #[test]
    fn test_build_missing_vault() {
        let dir = tempdir().unwrap();
        let err = LexicalIndex::build(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, VaultError::VaultNotFound(_)));
    }
}
