// src/core/query.rs
use crate::core::engine::SuggestIndex;
use crate::core::normalize::{alpha_normalize, lower_normalize};
use crate::core::types::ItemData;
use crate::proto::{self, SuggestTrie};
use crate::transform::from_struct;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// One query against a suggest index. `original_part` is what the user typed
/// (used for highlighting), `normalized_part` its trie key form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionParameters {
    pub original_part: String,
    pub normalized_part: String,
    /// Required classes; empty means any class.
    #[serde(default)]
    pub classes: HashSet<String>,
    #[serde(default)]
    pub excluded_classes: HashSet<String>,
}

impl SuggestionParameters {
    pub fn new(original_part: &str, normalized_part: &str) -> Self {
        Self {
            original_part: original_part.to_string(),
            normalized_part: normalized_part.to_string(),
            ..Self::default()
        }
    }

    pub fn require<I: IntoIterator<Item = S>, S: Into<String>>(mut self, classes: I) -> Self {
        self.classes.extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I: IntoIterator<Item = S>, S: Into<String>>(mut self, classes: I) -> Self {
        self.excluded_classes.extend(classes.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionTextBlock {
    pub text: String,
    #[serde(rename = "hl")]
    pub highlight: bool,
}

impl SuggestionTextBlock {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), highlight: false }
    }

    fn highlighted(text: &str) -> Self {
        Self { text: text.to_string(), highlight: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestAnswerItem {
    pub weight: f32,
    pub data: ItemData,
    #[serde(rename = "text")]
    pub text_blocks: Vec<SuggestionTextBlock>,
}

/// An item found at the result node, before class filtering.
#[derive(Debug, Clone)]
pub struct SuggestCandidate<'a> {
    pub item: &'a proto::Item,
    pub weight: f32,
    pub classes: Vec<&'a str>,
}

/// Descends `prefix` byte by byte, then skips pass-through nodes down to the
/// first node that carries buckets. `None` when the prefix is not in the trie.
fn find_result_node<'a>(root: &'a SuggestTrie, prefix: &[u8]) -> Option<&'a SuggestTrie> {
    let mut trie = root;
    for &c in prefix {
        let idx = trie.descendant_keys.iter().position(|&key| key == u32::from(c))?;
        trie = trie.descendant_tries.get(idx)?;
    }
    // Class filters apply at this node only, never along the skipped chain.
    while trie.descendant_keys.len() == 1 && trie.items.is_empty() {
        match trie.descendant_tries.first() {
            Some(next) => trie = next,
            None => break,
        }
    }
    Some(trie)
}

/// Lower-normalized lookup set; empty strings are dropped.
pub fn prepare_check_set(values: &HashSet<String>) -> HashSet<String> {
    values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| lower_normalize(v))
        .collect()
}

/// Kept iff no required set or some class is required, and no class is excluded.
pub fn item_satisfies_classes(classes: &[&str], required: &HashSet<String>, excluded: &HashSet<String>) -> bool {
    let included = required.is_empty() || classes.iter().any(|c| required.contains(*c));
    included && !classes.iter().any(|c| excluded.contains(*c))
}

/// Items of the result node for `params`, class-filtered and sorted by weight
/// (descending, stable).
pub fn get_suggest_items<'a>(index: &'a SuggestIndex, params: &SuggestionParameters) -> Vec<SuggestCandidate<'a>> {
    let Some(node) = find_result_node(index.root(), params.normalized_part.as_bytes()) else {
        return Vec::new();
    };

    let mut candidates: Vec<SuggestCandidate<'a>> = Vec::new();
    let mut positions: HashMap<u32, usize> = HashMap::new();
    for bucket in &node.items {
        for (&item_index, &weight) in bucket.item_indexes.iter().zip(&bucket.item_weights) {
            let Some(item) = index.item(item_index) else {
                warn!(item_index, "bucket references a missing item");
                continue;
            };
            let pos = *positions.entry(item_index).or_insert_with(|| {
                candidates.push(SuggestCandidate { item, weight, classes: Vec::new() });
                candidates.len() - 1
            });
            let candidate = &mut candidates[pos];
            candidate.weight = candidate.weight.max(weight);
            candidate.classes.push(bucket.class.as_str());
        }
    }

    let required = prepare_check_set(&params.classes);
    let excluded = prepare_check_set(&params.excluded_classes);
    candidates.retain(|c| item_satisfies_classes(&c.classes, &required, &excluded));
    candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    candidates
}

/// Ranked, highlighted answers for `params`. A prefix miss is an empty list.
pub fn get_suggest(index: &SuggestIndex, params: &SuggestionParameters) -> Vec<SuggestAnswerItem> {
    get_suggest_items(index, params)
        .into_iter()
        .map(|candidate| SuggestAnswerItem {
            weight: candidate.weight,
            data: candidate.item.data.as_ref().map(from_struct).unwrap_or_default(),
            text_blocks: do_highlight(&params.original_part, &candidate.item.original_text),
        })
        .collect()
}

/// Splits `original_suggest` into plain and highlighted blocks, matching the
/// whitespace fields of `original_part` left to right. Matching runs on the
/// lowercased suggestion and every span is mapped back to the original text
/// char by char. A match that ends inside the lowercase form of a single
/// character (e.g. the `i` of a lowercased `İ`) stops the highlighter; the
/// blocks gathered so far are returned.
pub fn do_highlight(original_part: &str, original_suggest: &str) -> Vec<SuggestionTextBlock> {
    let part = alpha_normalize(original_part).to_lowercase();
    let (lowered, offsets) = lower_with_offsets(original_suggest);
    let to_original = |lowered_offset: usize| {
        offsets
            .binary_search_by_key(&lowered_offset, |&(l, _)| l)
            .ok()
            .map(|k| offsets[k].1)
    };
    let fields: Vec<&str> = part.split_whitespace().collect();

    let mut blocks = Vec::new();
    let mut pos = 0;
    let mut original_pos = 0;
    for (idx, &field) in fields.iter().enumerate() {
        let Some(found) = lowered.get(pos..).and_then(|rest| rest.find(field)) else {
            warn!(part = original_part, suggest = original_suggest, field, "highlight field not found");
            break;
        };
        let start = pos + found;
        let end = start + field.len();
        let (Some(original_start), Some(original_end)) = (to_original(start), to_original(end)) else {
            warn!(suggest = original_suggest, field, "match splits a case-mapped character, highlight truncated");
            break;
        };

        let before = &original_suggest[original_pos..original_start];
        if !before.is_empty() {
            blocks.push(SuggestionTextBlock::plain(before));
        }
        blocks.push(SuggestionTextBlock::highlighted(&original_suggest[original_start..original_end]));
        if idx + 1 == fields.len() && original_end < original_suggest.len() {
            blocks.push(SuggestionTextBlock::plain(&original_suggest[original_end..]));
        }
        pos = end;
        original_pos = original_end;
    }
    blocks
}

/// Lowercases `text` and records, for every char boundary, the pair
/// `(offset in lowered, offset in text)`, ending with both lengths.
fn lower_with_offsets(text: &str) -> (String, Vec<(usize, usize)>) {
    let mut lowered = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len() + 1);
    for (i, c) in text.char_indices() {
        offsets.push((lowered.len(), i));
        lowered.extend(c.to_lowercase());
    }
    offsets.push((lowered.len(), text.len()));
    (lowered, offsets)
}
