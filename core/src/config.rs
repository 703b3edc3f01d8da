//! Runtime settings for loading and searching a subtitle store.

use crate::error::LoadError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_STORE_PATH: &str = "./eng_subtitles_database.db";
pub const DEFAULT_TABLE: &str = "zipfiles";
pub const DEFAULT_RETENTION_FRACTION: f64 = 0.3;
pub const DEFAULT_TOP_K: usize = 2;
pub const DEFAULT_PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// SQLite file holding the subtitle rows.
    pub store_path: PathBuf,
    /// Preferred table; the first table in the store is used when absent.
    pub table: String,
    /// Share of extracted subtitles kept in memory, in (0, 1].
    pub retention_fraction: f64,
    /// Results returned per query when the caller gives no `k`.
    pub top_k: usize,
    /// Characters of normalized text shown per result.
    pub preview_chars: usize,
    /// Fixed sampling seed; `None` draws from system entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            table: DEFAULT_TABLE.to_string(),
            retention_fraction: DEFAULT_RETENTION_FRACTION,
            top_k: DEFAULT_TOP_K,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Build configuration from defaults overridden by environment variables.
    ///
    /// Environment variables used:
    /// - `SUBSEARCH_DB`
    /// - `SUBSEARCH_TABLE` (default: "zipfiles")
    /// - `SUBSEARCH_RETENTION` (default: 0.3)
    /// - `SUBSEARCH_TOP_K` (default: 2)
    /// - `SUBSEARCH_PREVIEW_CHARS` (default: 150)
    /// - `SUBSEARCH_SEED` (optional)
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(path) = env_parse::<PathBuf>("SUBSEARCH_DB")? {
            cfg.store_path = path;
        }
        if let Some(table) = env_parse::<String>("SUBSEARCH_TABLE")? {
            cfg.table = table;
        }
        if let Some(fraction) = env_parse::<f64>("SUBSEARCH_RETENTION")? {
            cfg.retention_fraction = fraction;
        }
        if let Some(k) = env_parse::<usize>("SUBSEARCH_TOP_K")? {
            cfg.top_k = k;
        }
        if let Some(n) = env_parse::<usize>("SUBSEARCH_PREVIEW_CHARS")? {
            cfg.preview_chars = n;
        }
        cfg.seed = env_parse::<u64>("SUBSEARCH_SEED")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> std::result::Result<(), LoadError> {
        if !(self.retention_fraction > 0.0 && self.retention_fraction <= 1.0) {
            return Err(LoadError::Config(format!(
                "retention fraction must be in (0, 1], got {}",
                self.retention_fraction
            )));
        }
        if self.top_k == 0 {
            return Err(LoadError::Config("top_k must be at least 1".into()));
        }
        if self.table.trim().is_empty() {
            return Err(LoadError::Config("table name must not be empty".into()));
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => {
            let parsed = val
                .trim()
                .parse::<T>()
                .with_context(|| format!("failed to parse env variable: {key} = '{val}'"))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}
