// src/core/types.rs
use crate::core::normalize::lower_normalize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Open-schema attribute map carried by every item.
pub type ItemData = serde_json::Map<String, serde_json::Value>;

/// Build-time identity of an item. Assigned by the builder when the item is
/// added; two trie entries refer to the same item iff their ids are equal.
pub type ItemId = usize;

/// Index of a node inside the builder arena.
pub type NodeId = usize;

pub const CLASS_KEY: &str = "class";
pub const CLASSES_KEY: &str = "classes";
pub const GROUP_KEY: &str = "group";

/// A single suggestion record as produced by the item loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub weight: f32,
    pub original_text: String,
    pub normalized_text: String,
    #[serde(default)]
    pub data: ItemData,
}

impl Item {
    pub fn new(weight: f32, original_text: &str, normalized_text: &str, data: ItemData) -> Self {
        Self {
            weight,
            original_text: original_text.to_string(),
            normalized_text: normalized_text.to_string(),
            data,
        }
    }

    /// Classes of the item: the legacy `class` value first, then every entry
    /// of `classes`. Lower-normalized, first occurrence wins.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        let mut seen = HashSet::new();

        let legacy = self.data.get(CLASS_KEY).and_then(|v| v.as_str());
        let current = self
            .data
            .get(CLASSES_KEY)
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str());

        for class in legacy.into_iter().chain(current) {
            let class = lower_normalize(class);
            if seen.insert(class.clone()) {
                classes.push(class);
            }
        }
        classes
    }

    /// Dedup group of the item, if it carries one.
    pub fn group(&self) -> Option<&str> {
        self.data.get(GROUP_KEY).and_then(|v| v.as_str())
    }
}

/// An item reference stored in a trie bucket together with the weight it has
/// under this particular insertion (full text or suffix rotation).
#[derive(Debug, Clone, Copy)]
pub struct TrieItem {
    pub weight: f32,
    pub item: ItemId,
}

impl PartialEq for TrieItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TrieItem {}

impl PartialOrd for TrieItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TrieItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.item.cmp(&other.item))
    }
}
