use crate::config::BuildSettings;
use crate::core::query::{self, SuggestAnswerItem, SuggestionParameters};
use crate::core::trie::TrieBuilder;
use crate::core::types::Item;
use crate::error::{Result, SuggestError};
use crate::pagination::{paginate, PaginatedSuggestResponse};
use crate::proto::{self, SuggestData, SuggestTrie};
use crate::transform::transform;
use prost::Message;
use tracing::{debug, info};

const PROGRESS_EVERY: usize = 100_000;

/// Builds the serialized suggest artifact for `items`.
pub fn build_suggest(items: Vec<Item>, max_items_per_prefix: usize, postfix_weight_factor: f32) -> Result<SuggestData> {
    let total = items.len();
    let mut builder = TrieBuilder::with_settings(BuildSettings {
        max_items_per_prefix,
        postfix_weight_factor,
    });
    for (idx, item) in items.into_iter().enumerate() {
        builder.add(item);
        if (idx + 1) % PROGRESS_EVERY == 0 {
            info!("added {} items of {} to suggest", idx + 1, total);
        }
    }
    info!("finalizing suggest");
    let trie = builder.finalize();
    transform(&trie)
}

/// A loaded, validated suggest artifact. Read-only; share it across threads
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SuggestIndex {
    data: SuggestData,
    root: SuggestTrie,
}

impl SuggestIndex {
    /// Checks the decode invariants of `data` and wraps it.
    pub fn from_data(mut data: SuggestData) -> Result<Self> {
        let root = data
            .trie
            .take()
            .ok_or_else(|| SuggestError::Decode("artifact has no root trie".to_string()))?;
        let nodes = validate_trie(&root, data.items.len())?;
        debug!(nodes, items = data.items.len(), "validated suggest artifact");
        Ok(Self { data, root })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_data(SuggestData::decode(bytes)?)
    }

    pub fn root(&self) -> &SuggestTrie {
        &self.root
    }

    pub fn item(&self, index: u32) -> Option<&proto::Item> {
        self.data.items.get(index as usize)
    }

    pub fn item_count(&self) -> usize {
        self.data.items.len()
    }

    /// Re-assembles the wire form, e.g. to persist it again.
    pub fn to_data(&self) -> SuggestData {
        SuggestData {
            trie: Some(self.root.clone()),
            items: self.data.items.clone(),
        }
    }

    pub fn get_suggest(&self, params: &SuggestionParameters) -> Vec<SuggestAnswerItem> {
        query::get_suggest(self, params)
    }

    pub fn get_suggest_page(&self, params: &SuggestionParameters, page_number: usize, page_size: usize) -> PaginatedSuggestResponse {
        paginate(self.get_suggest(params), page_number, page_size)
    }
}

/// Walks the whole trie without recursion. Returns the node count.
fn validate_trie(root: &SuggestTrie, item_count: usize) -> Result<usize> {
    let mut stack = vec![root];
    let mut nodes = 0;
    while let Some(node) = stack.pop() {
        nodes += 1;
        if node.descendant_keys.len() != node.descendant_tries.len() {
            return Err(SuggestError::Decode(format!(
                "{} descendant keys but {} descendant tries",
                node.descendant_keys.len(),
                node.descendant_tries.len()
            )));
        }
        if let Some(key) = node.descendant_keys.iter().find(|&&k| k > u32::from(u8::MAX)) {
            return Err(SuggestError::Decode(format!("descendant key {key} is not a byte")));
        }
        for bucket in &node.items {
            if bucket.item_weights.len() != bucket.item_indexes.len() {
                return Err(SuggestError::Decode(format!(
                    "class {:?} has {} weights but {} indexes",
                    bucket.class,
                    bucket.item_weights.len(),
                    bucket.item_indexes.len()
                )));
            }
            if let Some(index) = bucket.item_indexes.iter().find(|&&i| i as usize >= item_count) {
                return Err(SuggestError::Decode(format!(
                    "item index {index} out of range for {item_count} items"
                )));
            }
        }
        stack.extend(node.descendant_tries.iter());
    }
    Ok(nodes)
}
