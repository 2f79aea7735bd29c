use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Corpus-level metadata carried into the builder export's configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusMeta {
    pub name: String,
    pub description: String,
    /// Corpus release date, ISO `YYYY-MM-DD`
    pub date: String,
    pub revision: String,
    pub authors: String,
}

/// Load and validate corpus metadata from a JSON file
pub fn load_corpus_meta(path: &Path) -> Result<CorpusMeta> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus metadata: {:?}", path))?;
    let meta: CorpusMeta = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse corpus metadata: {:?}", path))?;

    NaiveDate::parse_from_str(&meta.date, "%Y-%m-%d")
        .with_context(|| format!("Corpus date {:?} is not a valid YYYY-MM-DD date", meta.date))?;

    Ok(meta)
}
