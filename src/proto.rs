// src/proto.rs
//! Wire schema of the suggest artifact. Field tags are shared by the offline
//! builder and the online reader and must not change.

/// Root of the serialized artifact.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SuggestData {
    #[prost(message, optional, tag = "1")]
    pub trie: ::core::option::Option<SuggestTrie>,
    #[prost(message, repeated, tag = "2")]
    pub items: ::prost::alloc::vec::Vec<Item>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SuggestTrie {
    /// Byte values of the children, parallel to `descendant_tries`.
    #[prost(uint32, repeated, tag = "1")]
    pub descendant_keys: ::prost::alloc::vec::Vec<u32>,
    #[prost(message, repeated, tag = "2")]
    pub descendant_tries: ::prost::alloc::vec::Vec<SuggestTrie>,
    #[prost(message, repeated, tag = "3")]
    pub items: ::prost::alloc::vec::Vec<ClassItems>,
}

/// One class bucket of a node, weight-descending.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClassItems {
    #[prost(string, tag = "1")]
    pub class: ::prost::alloc::string::String,
    #[prost(float, repeated, tag = "2")]
    pub item_weights: ::prost::alloc::vec::Vec<f32>,
    /// Indexes into `SuggestData::items`.
    #[prost(uint32, repeated, tag = "3")]
    pub item_indexes: ::prost::alloc::vec::Vec<u32>,
}

/// Interned item record.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(float, tag = "1")]
    pub weight: f32,
    #[prost(string, tag = "2")]
    pub original_text: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub data: ::core::option::Option<::prost_types::Struct>,
}
