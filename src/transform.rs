// src/transform.rs
use crate::core::trie::{FinalNode, FinalizedTrie};
use crate::core::types::{ItemData, ItemId};
use crate::error::{Result, SuggestError};
use crate::proto;
use prost_types::value::Kind;
use prost_types::{ListValue, Struct, Value};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info};

/// Largest integer magnitude an f64 holds exactly.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Flattens a finalized trie into the wire schema, interning every item the
/// first time a bucket references it.
struct ProtoTransformer<'a> {
    trie: &'a FinalizedTrie,
    interned: HashMap<ItemId, u32>,
    items: Vec<proto::Item>,
}

impl<'a> ProtoTransformer<'a> {
    fn new(trie: &'a FinalizedTrie) -> Self {
        Self {
            trie,
            interned: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn transform_node(&mut self, node: &FinalNode) -> Result<proto::SuggestTrie> {
        let trie = self.trie;
        let mut out = proto::SuggestTrie::default();
        for (key, child) in trie.children(node) {
            let descendant = self.transform_node(child)?;
            out.descendant_keys.push(u32::from(key));
            out.descendant_tries.push(descendant);
        }
        for bucket in &node.buckets {
            let mut class_items = proto::ClassItems {
                class: bucket.class.clone(),
                item_weights: Vec::with_capacity(bucket.items.len()),
                item_indexes: Vec::with_capacity(bucket.items.len()),
            };
            for entry in &bucket.items {
                let index = self.intern(entry.item)?;
                class_items.item_weights.push(entry.weight);
                class_items.item_indexes.push(index);
            }
            out.items.push(class_items);
        }
        Ok(out)
    }

    fn intern(&mut self, id: ItemId) -> Result<u32> {
        if let Some(&index) = self.interned.get(&id) {
            return Ok(index);
        }
        let item = self
            .trie
            .item(id)
            .ok_or_else(|| SuggestError::Structure(format!("bucket references unknown item {id}")))?;
        let index = u32::try_from(self.items.len())
            .map_err(|_| SuggestError::Structure("item table exceeds u32 index space".to_string()))?;
        self.items.push(proto::Item {
            weight: item.weight,
            original_text: item.original_text.clone(),
            data: Some(to_struct(&item.data)?),
        });
        self.interned.insert(id, index);
        Ok(index)
    }
}

/// Serializes a finalized trie into the artifact schema.
pub fn transform(trie: &FinalizedTrie) -> Result<proto::SuggestData> {
    let mut transformer = ProtoTransformer::new(trie);
    let root = transformer.transform_node(trie.root())?;
    info!(
        nodes = trie.node_count(),
        interned = transformer.items.len(),
        "serialized suggest trie"
    );
    Ok(proto::SuggestData {
        trie: Some(root),
        items: transformer.items,
    })
}

pub fn to_struct(data: &ItemData) -> Result<Struct> {
    let mut fields = std::collections::BTreeMap::new();
    for (key, value) in data {
        let value = to_value(value).map_err(|e| match e {
            SuggestError::Structure(reason) => SuggestError::Structure(format!("{key}: {reason}")),
            other => other,
        })?;
        fields.insert(key.clone(), value);
    }
    Ok(Struct { fields })
}

fn to_value(value: &JsonValue) -> Result<Value> {
    let kind = match value {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(*b),
        JsonValue::Number(n) => Kind::NumberValue(number_to_f64(n)?),
        JsonValue::String(s) => Kind::StringValue(s.clone()),
        JsonValue::Array(values) => Kind::ListValue(ListValue {
            values: values.iter().map(to_value).collect::<Result<_>>()?,
        }),
        JsonValue::Object(map) => Kind::StructValue(to_struct(map)?),
    };
    Ok(Value { kind: Some(kind) })
}

fn number_to_f64(n: &serde_json::Number) -> Result<f64> {
    let exact = |magnitude: u64| magnitude <= MAX_EXACT_INTEGER;
    if let Some(i) = n.as_i64() {
        if !exact(i.unsigned_abs()) {
            return Err(SuggestError::Structure(format!("integer {i} is not representable as a number")));
        }
        return Ok(i as f64);
    }
    if let Some(u) = n.as_u64() {
        if !exact(u) {
            return Err(SuggestError::Structure(format!("integer {u} is not representable as a number")));
        }
        return Ok(u as f64);
    }
    n.as_f64()
        .ok_or_else(|| SuggestError::Structure(format!("number {n} is not representable")))
}

/// Converts a stored `Struct` back into an attribute map. Integral numbers
/// in the exact range come back as integers.
pub fn from_struct(data: &Struct) -> ItemData {
    data.fields
        .iter()
        .map(|(key, value)| (key.clone(), from_value(value)))
        .collect()
}

fn from_value(value: &Value) -> JsonValue {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Kind::NumberValue(f)) => from_number(*f),
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::ListValue(list)) => JsonValue::Array(list.values.iter().map(from_value).collect()),
        Some(Kind::StructValue(s)) => JsonValue::Object(from_struct(s)),
    }
}

fn from_number(f: f64) -> JsonValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER as f64 {
        return JsonValue::from(f as i64);
    }
    match serde_json::Number::from_f64(f) {
        Some(n) => JsonValue::Number(n),
        None => {
            debug!(value = f, "non-finite number mapped to null");
            JsonValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildSettings;
    use crate::core::trie::TrieBuilder;
    use crate::core::types::Item;
    use serde_json::json;

    fn data(value: JsonValue) -> ItemData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn structured_data_survives_the_round_trip() {
        let original = data(json!({
            "classes": ["a", "b"],
            "group": "g",
            "nested": {"flag": true, "none": null, "ratio": 0.25},
            "count": 42
        }));
        let back = from_struct(&to_struct(&original).unwrap());
        assert_eq!(back, original);
    }

    #[test]
    fn oversized_integers_are_rejected() {
        let err = to_struct(&data(json!({"id": u64::MAX}))).unwrap_err();
        match err {
            SuggestError::Structure(reason) => assert!(reason.starts_with("id:")),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(to_struct(&data(json!({"id": 1u64 << 53}))).is_ok());
    }

    #[test]
    fn every_item_is_interned_once() {
        let mut builder = TrieBuilder::with_settings(BuildSettings {
            max_items_per_prefix: 10,
            postfix_weight_factor: 0.5,
        });
        builder.add(Item::new(1.0, "Big Red Apple", "big red apple", data(json!({"classes": ["x", "y"]}))));
        builder.add(Item::new(0.5, "Red", "red", data(json!({"classes": ["x"]}))));
        let out = transform(&builder.finalize()).unwrap();

        assert_eq!(out.items.len(), 2);
        let mut seen: HashMap<String, u32> = HashMap::new();
        let mut stack = vec![out.trie.as_ref().unwrap()];
        while let Some(node) = stack.pop() {
            assert_eq!(node.descendant_keys.len(), node.descendant_tries.len());
            for bucket in &node.items {
                assert_eq!(bucket.item_weights.len(), bucket.item_indexes.len());
                for &index in &bucket.item_indexes {
                    let text = out.items[index as usize].original_text.clone();
                    assert_eq!(*seen.entry(text).or_insert(index), index);
                }
            }
            stack.extend(node.descendant_tries.iter());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn intern_order_follows_depth_first_discovery() {
        let mut builder = TrieBuilder::with_settings(BuildSettings {
            max_items_per_prefix: 10,
            postfix_weight_factor: 0.5,
        });
        builder.add(Item::new(1.0, "A", "a", data(json!({"classes": ["c"]}))));
        builder.add(Item::new(1.0, "AB", "ab", data(json!({"classes": ["c"]}))));
        let out = transform(&builder.finalize()).unwrap();
        // the deepest bucket ("ab") is emitted before its ancestors'.
        assert_eq!(out.items[0].original_text, "AB");
        assert_eq!(out.items[1].original_text, "A");
    }
}
