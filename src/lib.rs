// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pagination;
pub mod persistence;
pub mod proto;
pub mod transform;

pub use crate::core::engine::{build_suggest, SuggestIndex};
pub use crate::core::query::{do_highlight, get_suggest, SuggestAnswerItem, SuggestionParameters, SuggestionTextBlock};
pub use crate::core::types::Item;
pub use crate::error::{Result, SuggestError};
pub use crate::pagination::{paginate, PaginatedSuggestResponse};
pub use crate::persistence::{load_suggest, save_suggest};
