// src/config.rs
use crate::error::{Result, SuggestError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_ITEMS_PER_PREFIX: usize = 10;
pub const DEFAULT_POSTFIX_WEIGHT_FACTOR: f32 = 0.5;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Knobs of the offline trie build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Final per-bucket cap. The build-time heaps hold twice as many.
    pub max_items_per_prefix: usize,
    /// Weight multiplier for suffix rotations of an item's text.
    pub postfix_weight_factor: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            max_items_per_prefix: DEFAULT_MAX_ITEMS_PER_PREFIX,
            postfix_weight_factor: DEFAULT_POSTFIX_WEIGHT_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub page_size: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub build: BuildSettings,
    pub query: QuerySettings,
    pub logging: LoggingSettings,
}

impl SuggestConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| SuggestError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
