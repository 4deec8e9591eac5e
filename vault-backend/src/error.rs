//! Error taxonomy for the vault backend.
//!
//! Only `VaultNotFound` is fatal for whole-vault scans. Per-file read and
//! decode failures are skipped by the indexers and never surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault path not found: {}", .0.display())]
    VaultNotFound(PathBuf),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Invalid note path: {0}")]
    InvalidPath(String),

    #[error("Unknown template: {name}. Available: {}", .available.join(", "))]
    UnknownTemplate { name: String, available: Vec<String> },

    #[error("Template error in '{template}' - missing variable: {missing}")]
    Template { template: String, missing: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
