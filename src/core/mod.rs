// src/core/mod.rs

pub mod engine;
pub mod normalize;
pub mod query;
pub mod trie;
pub mod types;
