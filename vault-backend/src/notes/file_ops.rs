//! File operations for the vault
//!
//! Handles reading/writing markdown note files, vault traversal and
//! relative-path bookkeeping.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, VaultError};

pub const NOTE_EXTENSION: &str = "md";

/// Resolve a vault-relative note path to an absolute one, appending `.md` when missing.
/// Absolute paths and `..` components are rejected.
pub fn note_path(vault_dir: &Path, rel_path: &str) -> Result<PathBuf> {
    let trimmed = rel_path.trim();
    if trimmed.is_empty() {
        return Err(VaultError::InvalidPath(rel_path.to_string()));
    }

    let with_ext = if trimmed.ends_with(".md") {
        trimmed.to_string()
    } else {
        format!("{}.md", trimmed)
    };

    let candidate = Path::new(&with_ext);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(VaultError::InvalidPath(rel_path.to_string()));
    }

    Ok(vault_dir.join(candidate))
}

/// Write a note file (creates parent directories as needed)
pub fn write_note(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Read a note file. Non-UTF-8 content surfaces as `InvalidData`.
pub fn read_note(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_note(path: &Path) -> bool {
    path.extension().map(|e| e == NOTE_EXTENSION).unwrap_or(false)
}

/// Markdown files found under a directory, plus entries the walk could not read
#[derive(Debug, Default)]
pub struct NoteScan {
    pub files: Vec<PathBuf>,
    pub unreadable: usize,
}

/// List all markdown files under `dir`, sorted. Hidden entries (like `.obsidian_mcp/`) are skipped.
pub fn list_notes(dir: &Path) -> io::Result<Vec<PathBuf>> {
    list_notes_in(dir, true)
}

/// List markdown files directly in `dir`, or recursively when `recursive` is set.
pub fn list_notes_in(dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    Ok(scan_notes(dir, recursive)?.files)
}

/// Walk `dir` for notes. Fails when `dir` itself is missing or cannot be listed;
/// unreadable entries below it are counted in `unreadable`.
pub fn scan_notes(dir: &Path, recursive: bool) -> io::Result<NoteScan> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        ));
    }
    fs::read_dir(dir)?;

    let mut walker = WalkDir::new(dir).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut scan = NoteScan::default();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_note(entry.path()) {
                    scan.files.push(entry.into_path());
                }
            }
            Err(e) if e.path() == Some(dir) => return Err(e.into()),
            Err(e) => {
                log::debug!("[NOTES] Skipping unreadable entry: {}", e);
                scan.unreadable += 1;
            }
        }
    }

    scan.files.sort();
    Ok(scan)
}

/// Get relative path from vault_dir for a file, always with `/` separators
pub fn relative_path(vault_dir: &Path, file_path: &Path) -> Option<String> {
    let rel = file_path.strip_prefix(vault_dir).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

/// Filename without extension of a vault-relative path ("ideas/My Idea.md" -> "My Idea")
pub fn stem_of(rel_path: &str) -> String {
    Path::new(rel_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_note_path_appends_extension() {
        let vault = Path::new("/vault");
        assert_eq!(
            note_path(vault, "ideas/idea1").unwrap(),
            PathBuf::from("/vault/ideas/idea1.md")
        );
        assert_eq!(
            note_path(vault, "note.md").unwrap(),
            PathBuf::from("/vault/note.md")
        );
    }

    #[test]
    fn test_note_path_rejects_escapes() {
        let vault = Path::new("/vault");
        assert!(matches!(
            note_path(vault, "../outside"),
            Err(VaultError::InvalidPath(_))
        ));
        assert!(matches!(
            note_path(vault, "/etc/passwd"),
            Err(VaultError::InvalidPath(_))
        ));
        assert!(matches!(note_path(vault, "  "), Err(VaultError::InvalidPath(_))));
    }

    #[test]
    fn test_write_and_read_note() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/test-note.md");

        write_note(&path, "# Test\n\nContent here").unwrap();
        let content = read_note(&path).unwrap();
        assert!(content.contains("# Test"));
        assert!(content.contains("Content here"));
    }

    #[test]
    fn test_list_notes() {
        let dir = tempdir().unwrap();
        let vault = dir.path();

        fs::write(vault.join("note1.md"), "content").unwrap();
        fs::write(vault.join("readme.txt"), "not a note").unwrap();
        fs::create_dir(vault.join("ideas")).unwrap();
        fs::write(vault.join("ideas/idea1.md"), "content").unwrap();
        // Hidden state directory should be skipped
        fs::create_dir(vault.join(".obsidian_mcp")).unwrap();
        fs::write(vault.join(".obsidian_mcp/cache.md"), "state").unwrap();

        let files = list_notes(vault).unwrap();
        assert_eq!(files.len(), 2);

        let shallow = list_notes_in(vault, false).unwrap();
        assert_eq!(shallow, vec![vault.join("note1.md")]);
    }

    #[test]
    fn test_list_notes_missing_dir() {
        let dir = tempdir().unwrap();
        let err = list_notes(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    /// Returns false when permission bits are not enforced (e.g. running as root)
    #[cfg(unix)]
    fn lock(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read_dir(path).is_err()
    }

    #[cfg(unix)]
    fn unlock(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_root_fails() {
        let dir = tempdir().unwrap();
        let vault = dir.path().join("vault");
        fs::create_dir(&vault).unwrap();
        fs::write(vault.join("a.md"), "content").unwrap();

        let enforced = lock(&vault);
        let result = scan_notes(&vault, true);
        unlock(&vault);
        if enforced {
            assert!(result.is_err());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subfolder_is_counted() {
        let dir = tempdir().unwrap();
        let vault = dir.path();
        fs::write(vault.join("a.md"), "content").unwrap();
        fs::create_dir(vault.join("locked")).unwrap();
        fs::write(vault.join("locked/b.md"), "content").unwrap();

        let enforced = lock(&vault.join("locked"));
        let scan = scan_notes(vault, true);
        unlock(&vault.join("locked"));

        let scan = scan.unwrap();
        if enforced {
            assert_eq!(scan.files, vec![vault.join("a.md")]);
            assert_eq!(scan.unreadable, 1);
        } else {
            assert_eq!(scan.files.len(), 2);
            assert_eq!(scan.unreadable, 0);
        }
    }

    #[test]
    fn test_relative_path_and_stem() {
        let vault = Path::new("/vault");
        let rel = relative_path(vault, Path::new("/vault/ideas/My Idea.md")).unwrap();
        assert_eq!(rel, "ideas/My Idea.md");
        assert_eq!(stem_of(&rel), "My Idea");
        assert!(relative_path(vault, Path::new("/elsewhere/x.md")).is_none());
    }
}
