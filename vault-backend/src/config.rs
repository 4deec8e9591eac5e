use std::env;
use std::path::{Path, PathBuf};

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const VAULT_PATH: &str = "OBSIDIAN_VAULT_PATH";
    /// Hidden directory inside the vault holding backend state (memory.db).
    pub const STATE_DIR: &str = "VAULT_STATE_DIR";
    pub const SIMILARITY_THRESHOLD: &str = "SIMILARITY_THRESHOLD";
    pub const DUPLICATE_THRESHOLD: &str = "DUPLICATE_THRESHOLD";
}

/// Default values
pub mod defaults {
    pub const VAULT_DIR: &str = "Documents/ObsidianVault";
    pub const STATE_DIR: &str = ".obsidian_mcp";
    pub const MEMORY_DB: &str = "memory.db";
    pub const SIMILARITY_THRESHOLD: f64 = 0.3;
    pub const DUPLICATE_THRESHOLD: f64 = 0.7;
    pub const SIMILAR_LIMIT: usize = 10;
    pub const SEARCH_LIMIT: usize = 10;
    pub const RECALL_DAYS: i64 = 30;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub vault_path: PathBuf,
    pub state_dir: String,
    pub similarity_threshold: f64,
    pub duplicate_threshold: f64,
}

impl Config {
    /// Load configuration from the environment (call `dotenv().ok()` first).
    pub fn from_env() -> Self {
        let vault_path = env::var(env_vars::VAULT_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_vault_path());
        let state_dir =
            env::var(env_vars::STATE_DIR).unwrap_or_else(|_| defaults::STATE_DIR.to_string());

        Self {
            vault_path,
            state_dir,
            similarity_threshold: parse_threshold(
                env::var(env_vars::SIMILARITY_THRESHOLD).ok().as_deref(),
                defaults::SIMILARITY_THRESHOLD,
            ),
            duplicate_threshold: parse_threshold(
                env::var(env_vars::DUPLICATE_THRESHOLD).ok().as_deref(),
                defaults::DUPLICATE_THRESHOLD,
            ),
        }
    }

    /// Defaults for an explicit vault path (no environment lookups)
    pub fn with_vault(vault_path: impl Into<PathBuf>) -> Self {
        Self {
            vault_path: vault_path.into(),
            state_dir: defaults::STATE_DIR.to_string(),
            similarity_threshold: defaults::SIMILARITY_THRESHOLD,
            duplicate_threshold: defaults::DUPLICATE_THRESHOLD,
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.vault_path.join(&self.state_dir)
    }

    pub fn memory_db_path(&self) -> PathBuf {
        self.state_path().join(defaults::MEMORY_DB)
    }
}

fn default_vault_path() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(defaults::VAULT_DIR)
}

/// Parse a threshold in [0, 1], falling back to `default` when unset or invalid.
pub fn parse_threshold(raw: Option<&str>, default: f64) -> f64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => v,
        _ => {
            log::warn!("[CONFIG] Ignoring invalid threshold '{}', using {}", raw, default);
            default
        }
    }
}

/// Strict threshold parser for command-line values: anything outside [0, 1] is an error.
pub fn threshold_arg(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {}", value))
    }
}
