//! Curated capability table.
//!
//! A hand-maintained mapping from `(provider, model value)` to known
//! capabilities, context window, and lifecycle status. Pure data: the
//! upstream mapper uses it to fill gaps the external dataset leaves
//! open. Nothing depends on how the table is built, only on the lookup
//! contract.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::manifest::{Capabilities, Status};

/// Cached bundled capability table
static BUNDLED_TABLE: Lazy<Result<CapabilityTable>> = Lazy::new(|| {
    const CURATED_JSON: &str = include_str!("data/curated_capabilities.json");

    CapabilityTable::from_json(CURATED_JSON).context("Failed to parse bundled capability table")
});

/// One curated row: what we know about a model independent of the
/// upstream dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedEntry {
    #[serde(default)]
    pub capabilities: Capabilities,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    entries: HashMap<String, HashMap<String, CuratedEntry>>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bundled() -> Result<&'static Self> {
        BUNDLED_TABLE
            .as_ref()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, HashMap<String, CuratedEntry>> =
            serde_json::from_str(json).context("Failed to parse capability table JSON")?;
        Ok(Self { entries })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read capability table file")?;
        Self::from_json(&content)
    }

    /// Look up the curated entry for `(provider, value)`.
    pub fn lookup(&self, provider: &str, value: &str) -> Option<&CuratedEntry> {
        self.entries.get(provider).and_then(|m| m.get(value))
    }

    /// Iterate all `(provider, value, entry)` rows.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &CuratedEntry)> {
        self.entries.iter().flat_map(|(provider, models)| {
            models
                .iter()
                .map(move |(value, entry)| (provider.as_str(), value.as_str(), entry))
        })
    }

    pub fn count(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }
}
