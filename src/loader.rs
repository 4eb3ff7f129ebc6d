// src/loader.rs
use crate::core::normalize::normalize;
use crate::core::types::{Item, ItemData};
use crate::error::{Result, SuggestError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// An item as written in the source file. `normalized_text` is derived from
/// `original_text` when absent.
#[derive(Debug, Deserialize)]
struct ItemRecord {
    #[serde(default = "default_weight")]
    weight: f32,
    original_text: String,
    #[serde(default)]
    normalized_text: Option<String>,
    #[serde(default)]
    data: ItemData,
}

fn default_weight() -> f32 {
    1.0
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let normalized_text = record
            .normalized_text
            .unwrap_or_else(|| normalize(&record.original_text));
        Item {
            weight: record.weight,
            original_text: record.original_text,
            normalized_text,
            data: record.data,
        }
    }
}

/// Parses items from either a JSON array or JSON Lines (blank lines skipped).
pub fn parse_items(raw: &str) -> Result<Vec<Item>> {
    if raw.trim_start().starts_with('[') {
        let records: Vec<ItemRecord> = serde_json::from_str(raw).map_err(|e| SuggestError::Items {
            line: e.line(),
            reason: e.to_string(),
        })?;
        return Ok(records.into_iter().map(Item::from).collect());
    }

    let mut items = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: ItemRecord = serde_json::from_str(line).map_err(|e| SuggestError::Items {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        items.push(Item::from(record));
    }
    debug!(items = items.len(), "parsed item records");
    Ok(items)
}

pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let raw = fs::read_to_string(path)?;
    let items = parse_items(&raw)?;
    info!(path = %path.display(), items = items.len(), "loaded items");
    Ok(items)
}
