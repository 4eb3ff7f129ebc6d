// --- File: src/core/trie.rs
use crate::config::BuildSettings;
use crate::core::types::{Item, ItemId, NodeId, TrieItem};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use tracing::debug;

pub const ROOT: NodeId = 0;

// --- TrieBuilder: mutable trie used while ingesting items ---

/// Per-class candidate list of a node. The min-heap keeps the heaviest
/// `capacity` entries seen so far.
#[derive(Debug, Clone)]
struct ClassBucket {
    class: String,
    heap: BinaryHeap<Reverse<TrieItem>>,
}

impl ClassBucket {
    fn new(class: &str, first: TrieItem) -> Self {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(first));
        Self { class: class.to_string(), heap }
    }

    fn push(&mut self, item: TrieItem, capacity: usize) {
        self.heap.push(Reverse(item));
        while self.heap.len() > capacity {
            self.heap.pop();
        }
    }

    /// Same class and the same `(weight, item)` sequence in heap layout.
    fn same_contents(&self, other: &ClassBucket) -> bool {
        self.class == other.class
            && self.heap.len() == other.heap.len()
            && self.heap.iter().eq(other.heap.iter())
    }
}

#[derive(Debug, Clone, Default)]
struct BuilderNode {
    descendants: Vec<(u8, NodeId)>,
    buckets: Vec<ClassBucket>,
}

impl BuilderNode {
    fn child(&self, byte: u8) -> Option<NodeId> {
        self.descendants
            .iter()
            .find(|(key, _)| *key == byte)
            .map(|&(_, id)| id)
    }

    fn add_item(&mut self, item: TrieItem, classes: &[String], capacity: usize) {
        for class in classes {
            match self.buckets.iter_mut().find(|b| &b.class == class) {
                Some(bucket) => bucket.push(item, capacity),
                None => self.buckets.push(ClassBucket::new(class, item)),
            }
        }
    }

    fn same_buckets(&self, other: &BuilderNode) -> bool {
        self.buckets.len() == other.buckets.len()
            && self
                .buckets
                .iter()
                .zip(&other.buckets)
                .all(|(a, b)| a.same_contents(b))
    }
}

/// A mutable, arena-backed byte trie. Every node on the path of an inserted
/// string keeps a bounded top-k list of candidates per class.
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    nodes: Vec<BuilderNode>,
    items: Vec<Item>,
    settings: BuildSettings,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::with_settings(BuildSettings::default())
    }

    pub fn with_settings(settings: BuildSettings) -> Self {
        Self {
            nodes: vec![BuilderNode::default()],
            items: Vec::new(),
            settings,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Inserts the item under its full normalized text and under every
    /// space-delimited suffix rotation of it. Returns the item's identity.
    pub fn add(&mut self, item: Item) -> ItemId {
        let id = self.items.len();
        let classes = item.classes();
        // Slack for entries that finalization drops as group duplicates.
        let capacity = self.settings.max_items_per_prefix.saturating_mul(2);

        let full = TrieItem { weight: item.weight, item: id };
        self.insert(&item.normalized_text, full, &classes, capacity);

        let rotated = TrieItem {
            weight: item.weight * self.settings.postfix_weight_factor,
            item: id,
        };
        let parts: Vec<&str> = item.normalized_text.split(' ').collect();
        for start in 1..parts.len() {
            let rotation = parts[start..].join(" ");
            self.insert(&rotation, rotated, &classes, capacity);
        }

        self.items.push(item);
        id
    }

    /// Walks `key` byte by byte from the root, creating missing children, and
    /// records `item` at every node on the path, root and terminal included.
    /// O(k * c) where k is key length and c the number of classes.
    fn insert(&mut self, key: &str, item: TrieItem, classes: &[String], capacity: usize) {
        let mut node_idx = ROOT;
        self.nodes[node_idx].add_item(item, classes, capacity);
        for &byte in key.as_bytes() {
            let next_idx = if let Some(id) = self.nodes[node_idx].child(byte) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(BuilderNode::default());
                self.nodes[node_idx].descendants.push((byte, new_node_id));
                new_node_id
            };
            node_idx = next_idx;
            self.nodes[node_idx].add_item(item, classes, capacity);
        }
    }

    /// Freezes the trie: clears pass-through nodes, ranks every bucket by
    /// weight, drops group duplicates and cuts buckets to the final cap.
    pub fn finalize(self) -> FinalizedTrie {
        let max_items = self.settings.max_items_per_prefix;

        // Compare against the child's build-time buckets, before it is ranked.
        let pass_through: Vec<bool> = self
            .nodes
            .iter()
            .map(|node| match node.descendants.as_slice() {
                [(_, child)] => node.same_buckets(&self.nodes[*child]),
                _ => false,
            })
            .collect();
        let cleared = pass_through.iter().filter(|&&p| p).count();

        let items = self.items;
        let nodes: Vec<FinalNode> = self
            .nodes
            .into_iter()
            .zip(pass_through)
            .map(|(node, cleared_node)| {
                let buckets = if cleared_node {
                    Vec::new()
                } else {
                    node.buckets
                        .into_iter()
                        .map(|bucket| rank_bucket(bucket, &items, max_items))
                        .collect()
                };
                FinalNode { descendants: node.descendants, buckets }
            })
            .collect();

        debug!(
            nodes = nodes.len(),
            items = items.len(),
            pass_through = cleared,
            "finalized suggest trie"
        );
        FinalizedTrie { nodes, items }
    }
}

fn rank_bucket(bucket: ClassBucket, items: &[Item], max_items: usize) -> RankedBucket {
    let mut ranked: Vec<TrieItem> = bucket.heap.into_iter().map(|Reverse(t)| t).collect();
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let mut seen_groups = HashSet::new();
    ranked.retain(|t| match items[t.item].group() {
        Some(group) => seen_groups.insert(group),
        None => true,
    });
    ranked.truncate(max_items);

    RankedBucket { class: bucket.class, items: ranked }
}

// --- FinalizedTrie: frozen result of a build, input of the serializer ---

/// A class bucket after finalization: weight-descending, group-unique, capped.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedBucket {
    pub class: String,
    pub items: Vec<TrieItem>,
}

#[derive(Debug, Clone, Default)]
pub struct FinalNode {
    pub descendants: Vec<(u8, NodeId)>,
    pub buckets: Vec<RankedBucket>,
}

#[derive(Debug, Clone)]
pub struct FinalizedTrie {
    nodes: Vec<FinalNode>,
    items: Vec<Item>,
}

impl FinalizedTrie {
    pub fn root(&self) -> &FinalNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&FinalNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &FinalNode> {
        self.nodes.iter()
    }

    /// Children of `node` with their key bytes, in insertion order.
    pub fn children<'a>(&'a self, node: &'a FinalNode) -> impl Iterator<Item = (u8, &'a FinalNode)> + 'a {
        node.descendants
            .iter()
            .map(move |&(key, id)| (key, &self.nodes[id]))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Node reached by following `key` from the root, if present.
    pub fn descendant(&self, key: &[u8]) -> Option<&FinalNode> {
        let mut node = self.root();
        for &byte in key {
            let (_, next) = node.descendants.iter().find(|(k, _)| *k == byte)?;
            node = self.node(*next)?;
        }
        Some(node)
    }
}
