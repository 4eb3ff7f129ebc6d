use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use suggest_core::core::trie::TrieBuilder;
use suggest_core::config::BuildSettings;
use suggest_core::{
    build_suggest, do_highlight, get_suggest, load_suggest, save_suggest, Item, SuggestIndex,
    SuggestionParameters, SuggestionTextBlock,
};

fn item(original: &str, normalized: &str, weight: f32, data: Value) -> Item {
    Item::new(weight, original, normalized, data.as_object().cloned().unwrap_or_default())
}

fn index(items: Vec<Item>, max: usize, pwf: f32) -> SuggestIndex {
    SuggestIndex::from_data(build_suggest(items, max, pwf).unwrap()).unwrap()
}

fn texts(index: &SuggestIndex, params: &SuggestionParameters) -> Vec<String> {
    get_suggest(index, params)
        .into_iter()
        .map(|a| a.text_blocks.iter().map(|b| b.text.as_str()).collect())
        .collect()
}

fn weights(index: &SuggestIndex, params: &SuggestionParameters) -> Vec<f32> {
    get_suggest(index, params).into_iter().map(|a| a.weight).collect()
}

#[test]
fn basic_insert_and_query() {
    let idx = index(
        vec![
            item("Apple Pie", "apple pie", 1.0, json!({"classes": ["food"]})),
            item("Apricot", "apricot", 0.5, json!({"classes": ["food"]})),
        ],
        10,
        0.5,
    );
    let answers = get_suggest(&idx, &SuggestionParameters::new("ap", "ap"));
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].weight, 1.0);
    assert_eq!(answers[0].data["classes"], json!(["food"]));
    assert_eq!(texts(&idx, &SuggestionParameters::new("ap", "ap")), vec!["Apple Pie", "Apricot"]);
}

#[test]
fn suffix_rotation_uses_scaled_weight() {
    let idx = index(vec![item("Red Apple", "red apple", 1.0, json!({"classes": ["food"]}))], 10, 0.3);
    let answers = get_suggest(&idx, &SuggestionParameters::new("apple", "apple"));
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].weight, 1.0f32 * 0.3);
    assert_eq!(
        answers[0].text_blocks,
        vec![
            SuggestionTextBlock { text: "Red ".to_string(), highlight: false },
            SuggestionTextBlock { text: "Apple".to_string(), highlight: true },
        ]
    );
}

#[test]
fn every_rotation_prefix_retrieves_the_item() {
    let idx = index(vec![item("A B C", "a b c", 2.0, json!({"classes": ["x"]}))], 10, 0.5);
    for prefix in ["a", "b", "c", "a b", "b c"] {
        let found = weights(&idx, &SuggestionParameters::new(prefix, prefix));
        assert_eq!(found.len(), 1, "prefix {prefix:?}");
        let expected = if prefix.starts_with('a') { 2.0 } else { 1.0 };
        assert_eq!(found[0], expected, "prefix {prefix:?}");
    }
}

#[test]
fn class_filters() {
    let items = vec![
        item("XA", "xa", 1.0, json!({"classes": ["fruit"]})),
        item("XB", "xb", 0.9, json!({"class": "Veggie"})),
    ];
    let idx = index(items, 10, 0.5);

    let required = SuggestionParameters::new("x", "x").require(["fruit"]);
    assert_eq!(texts(&idx, &required), vec!["XA"]);

    let excluded = SuggestionParameters::new("x", "x").exclude(["VEGGIE"]);
    assert_eq!(texts(&idx, &excluded), vec!["XA"]);

    let both = SuggestionParameters::new("x", "x").require(["fruit", "veggie"]).exclude(["fruit"]);
    assert_eq!(texts(&idx, &both), vec!["XB"]);

    let unknown = SuggestionParameters::new("x", "x").require(["meat"]);
    assert!(get_suggest(&idx, &unknown).is_empty());
}

#[test]
fn multi_class_item_is_returned_once() {
    let idx = index(vec![item("Kiwi", "kiwi", 1.0, json!({"classes": ["fruit", "green"]}))], 10, 0.5);
    assert_eq!(texts(&idx, &SuggestionParameters::new("ki", "ki")), vec!["Kiwi"]);
    let excluded = SuggestionParameters::new("ki", "ki").exclude(["green"]);
    assert!(get_suggest(&idx, &excluded).is_empty());
}

#[test]
fn group_dedup_keeps_one_item() {
    let items = vec![
        item("Foo 1", "foo 1", 1.0, json!({"classes": ["c"], "group": "g1"})),
        item("Foo 2", "foo 2", 0.9, json!({"classes": ["c"], "group": "g1"})),
        item("Foo 3", "foo 3", 0.8, json!({"classes": ["c"], "group": "g1"})),
    ];
    let idx = index(items, 5, 0.5);
    assert_eq!(weights(&idx, &SuggestionParameters::new("foo", "foo")), vec![1.0]);
}

#[test]
fn empty_group_dedups_like_any_other_group() {
    let items = vec![
        item("Bar 1", "bar 1", 0.9, json!({"classes": ["c"], "group": ""})),
        item("Bar 2", "bar 2", 1.0, json!({"classes": ["c"], "group": ""})),
        item("Bar 3", "bar 3", 0.8, json!({"classes": ["c"]})),
    ];
    let idx = index(items, 5, 0.5);
    assert_eq!(weights(&idx, &SuggestionParameters::new("bar", "bar")), vec![1.0, 0.8]);
}

#[test]
fn top_k_truncation() {
    let items = (1..=100)
        .map(|w| {
            let text = format!("z{w}");
            item(&text, &text, w as f32, json!({"classes": ["c"]}))
        })
        .collect();
    let idx = index(items, 5, 0.5);
    assert_eq!(
        weights(&idx, &SuggestionParameters::new("z", "z")),
        vec![100.0, 99.0, 98.0, 97.0, 96.0]
    );
}

#[test]
fn highlight_blocks() {
    assert_eq!(
        do_highlight("Ap pi", "Apple Pie"),
        vec![
            SuggestionTextBlock { text: "Ap".to_string(), highlight: true },
            SuggestionTextBlock { text: "ple ".to_string(), highlight: false },
            SuggestionTextBlock { text: "Pi".to_string(), highlight: true },
            SuggestionTextBlock { text: "e".to_string(), highlight: false },
        ]
    );
}

#[test]
fn missing_prefix_is_empty() {
    let idx = index(vec![item("Apple", "apple", 1.0, json!({"classes": ["c"]}))], 10, 0.5);
    assert!(get_suggest(&idx, &SuggestionParameters::new("q", "q")).is_empty());
    assert!(get_suggest(&idx, &SuggestionParameters::new("apples", "apples")).is_empty());
}

#[test]
fn pass_through_chain_is_skipped_to_the_result_node() {
    let idx = index(vec![item("Banana", "banana", 1.0, json!({"classes": ["c"]}))], 10, 0.5);
    // every node on the single chain but the leaf was cleared.
    assert!(idx.root().items.is_empty());
    assert_eq!(texts(&idx, &SuggestionParameters::new("b", "b")), vec!["Banana"]);
    assert_eq!(texts(&idx, &SuggestionParameters::new("", "")), vec![""]);
}

#[test]
fn results_are_weight_descending_and_excludes_never_grow_results() {
    let items: Vec<Item> = (0..40)
        .map(|i| {
            let class = ["a", "b", "c"][i % 3];
            let text = format!("p{} q{}", i % 7, i);
            item(&text, &text, (i * 37 % 11) as f32, json!({"classes": [class]}))
        })
        .collect();
    let idx = index(items, 6, 0.5);

    for prefix in ["p", "p1", "q", "q1", "p3 q"] {
        let base = SuggestionParameters::new(prefix, prefix);
        let all = weights(&idx, &base);
        assert!(all.windows(2).all(|w| w[0] >= w[1]), "prefix {prefix:?}");

        let fewer = weights(&idx, &base.clone().exclude(["a"]));
        assert!(fewer.len() <= all.len());
        let narrower = weights(&idx, &base.clone().require(["b"]));
        let narrowest = weights(&idx, &base.clone().require(["b"]).exclude(["b"]));
        assert!(narrowest.len() <= narrower.len());
        assert!(narrowest.is_empty());
    }
}

#[test]
fn finalized_buckets_respect_the_cap_order_and_groups() {
    let mut builder = TrieBuilder::with_settings(BuildSettings {
        max_items_per_prefix: 3,
        postfix_weight_factor: 0.5,
    });
    for i in 0..50 {
        let text = format!("w{} v{}", i % 5, i);
        let group = if i % 2 == 0 { json!(format!("g{}", i % 4)) } else { Value::Null };
        builder.add(item(&text, &text, (i % 13) as f32, json!({"classes": ["c"], "group": group})));
    }
    let trie = builder.finalize();
    for node in trie.nodes() {
        for bucket in &node.buckets {
            assert!(bucket.items.len() <= 3);
            assert!(bucket.items.windows(2).all(|w| w[0].weight >= w[1].weight));
            let mut groups: Vec<&str> = bucket
                .items
                .iter()
                .filter_map(|t| trie.item(t.item).and_then(|i| i.group()))
                .collect();
            let before = groups.len();
            groups.sort_unstable();
            groups.dedup();
            assert_eq!(groups.len(), before);
        }
    }
}

#[test]
fn artifact_round_trip_preserves_answers() {
    let items = vec![
        item("Apple Pie", "apple pie", 1.0, json!({"classes": ["food"], "meta": {"n": 3, "tags": ["a", null, true]}})),
        item("Apricot", "apricot", 0.5, json!({"class": "food"})),
        item("Red Apple", "red apple", 0.7, json!({"classes": ["food", "fruit"]})),
    ];
    let artifact = build_suggest(items, 10, 0.5).unwrap();
    let in_memory = SuggestIndex::from_data(artifact.clone()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suggest.pb");
    save_suggest(&artifact, &path).unwrap();
    let loaded = load_suggest(&path).unwrap();

    for prefix in ["a", "ap", "apple", "apr", "red", "pie", "zzz", ""] {
        let params = SuggestionParameters::new(prefix, prefix);
        assert_eq!(get_suggest(&in_memory, &params), get_suggest(&loaded, &params), "prefix {prefix:?}");
    }
    let answers = get_suggest(&loaded, &SuggestionParameters::new("apple p", "apple p"));
    assert_eq!(answers[0].data["meta"], json!({"n": 3, "tags": ["a", null, true]}));
}

#[test]
fn concurrent_queries_share_one_index() {
    let items = (0..20)
        .map(|i| {
            let text = format!("item {i}");
            item(&text, &text, i as f32, json!({"classes": ["c"]}))
        })
        .collect();
    let idx = Arc::new(index(items, 5, 0.5));
    let expected = weights(&idx, &SuggestionParameters::new("item", "item"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let idx = Arc::clone(&idx);
            thread::spawn(move || weights(&idx, &SuggestionParameters::new("item", "item")))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
