//! Vault backend: note storage, templates, concept memory and vault
//! intelligence over an Obsidian-style markdown vault.

pub mod assistant;
pub mod config;
pub mod error;
pub mod intelligence;
pub mod memory;
pub mod notes;
pub mod organizer;
pub mod templates;

pub use error::{Result, VaultError};
