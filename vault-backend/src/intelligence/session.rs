//! VaultSession - one open vault with a cached intelligence snapshot
//!
//! The snapshot is keyed by a fingerprint of every note file's path, size and
//! modification time. A changed fingerprint triggers a rebuild, so cached
//! results always match a fresh scan.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use super::VaultIntelligence;
use crate::error::{Result, VaultError};
use crate::notes::{NoteStore, file_ops};
use crate::templates::TemplateManager;

struct CachedEngine {
    fingerprint: String,
    engine: Arc<VaultIntelligence>,
}

pub struct VaultSession {
    vault_dir: PathBuf,
    notes: NoteStore,
    templates: TemplateManager,
    cache: Mutex<Option<CachedEngine>>,
}

impl VaultSession {
    pub fn open(vault_dir: impl Into<PathBuf>) -> Result<Self> {
        let vault_dir = vault_dir.into();
        let notes = NoteStore::new(&vault_dir)?;
        log::info!("[VAULT] Opened vault at {}", vault_dir.display());
        Ok(Self {
            vault_dir,
            notes,
            templates: TemplateManager::new(),
            cache: Mutex::new(None),
        })
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    /// Read-only note access. Writes go through the session so the cache is invalidated.
    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn templates(&self) -> &TemplateManager {
        &self.templates
    }

    /// Current snapshot, rebuilt when the vault changed since the last call
    pub fn intelligence(&self) -> Result<Arc<VaultIntelligence>> {
        let fingerprint = vault_fingerprint(&self.vault_dir)?;
        let mut cache = self.cache.lock();

        if let Some(cached) = cache.as_ref() {
            if cached.fingerprint == fingerprint {
                return Ok(Arc::clone(&cached.engine));
            }
            log::debug!("[VAULT] Vault changed, rebuilding index");
        }

        let engine = Arc::new(VaultIntelligence::build(&self.vault_dir)?);
        *cache = Some(CachedEngine {
            fingerprint,
            engine: Arc::clone(&engine),
        });
        Ok(engine)
    }

    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    pub fn write_note(&self, rel_path: &str, content: &str, tags: &str, title: &str) -> Result<String> {
        let written = self.notes.write_note(rel_path, content, tags, title)?;
        self.invalidate();
        Ok(written)
    }

    pub fn create_structured_note(
        &self,
        rel_path: &str,
        template: &str,
        project: &str,
        content: &str,
        tags: &str,
    ) -> Result<String> {
        let written = self
            .notes
            .create_structured_note(&self.templates, rel_path, template, project, content, tags)?;
        self.invalidate();
        Ok(written)
    }
}

/// SHA-256 over sorted (path, size, mtime) of every note file
fn vault_fingerprint(vault_dir: &Path) -> Result<String> {
    let files = file_ops::list_notes(vault_dir)
        .map_err(|_| VaultError::VaultNotFound(vault_dir.to_path_buf()))?;

    let mut hasher = Sha256::new();
    for file in &files {
        let (size, mtime) = std::fs::metadata(file)
            .map(|m| {
                let nanos = m
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_nanos())
                    .unwrap_or(0);
                (m.len(), nanos)
            })
            .unwrap_or((0, 0));
        hasher.update(file.to_string_lossy().as_bytes());
        hasher.update(size.to_le_bytes());
        hasher.update(mtime.to_le_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}
