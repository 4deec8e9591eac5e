use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{file_ops, frontmatter};
use crate::error::{Result, VaultError};

/// One markdown file in the vault
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    /// Vault-relative path with `/` separators
    pub path: String,
    /// Frontmatter `title`, else the filename stem
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub word_count: usize,
    /// Frontmatter `created`/`date`, else the filesystem creation time
    pub created: String,
    pub modified: DateTime<Local>,
    pub metadata: BTreeMap<String, String>,
}

impl Note {
    /// Load and parse a note file located under `vault_dir`.
    pub fn load(vault_dir: &Path, file_path: &Path) -> Result<Self> {
        let rel_path = file_ops::relative_path(vault_dir, file_path)
            .ok_or_else(|| VaultError::InvalidPath(file_path.display().to_string()))?;

        let content = file_ops::read_note(file_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VaultError::NoteNotFound(rel_path.clone()),
            _ => VaultError::Io(e),
        })?;
        let meta = fs::metadata(file_path)?;

        let modified: DateTime<Local> = meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Local::now());
        let fs_created: DateTime<Local> = meta.created().map(DateTime::from).unwrap_or(modified);

        Ok(Self::from_content(&rel_path, &content, fs_created, modified))
    }

    /// Build a note from raw file content; timestamps are supplied by the caller.
    pub fn from_content(
        rel_path: &str,
        content: &str,
        fs_created: DateTime<Local>,
        modified: DateTime<Local>,
    ) -> Self {
        let parsed = frontmatter::parse_note(content);
        let fm = parsed.frontmatter;

        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| file_ops::stem_of(rel_path));
        let created = fm
            .created
            .unwrap_or_else(|| fs_created.format("%Y-%m-%d").to_string());

        Self {
            path: rel_path.to_string(),
            title,
            word_count: parsed.body.split_whitespace().count(),
            body: parsed.body,
            tags: fm.tags,
            created,
            modified,
            metadata: fm.fields,
        }
    }

    pub fn stem(&self) -> String {
        file_ops::stem_of(&self.path)
    }
}
