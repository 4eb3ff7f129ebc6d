// src/pagination.rs
use crate::core::query::SuggestAnswerItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedSuggestResponse {
    pub suggestions: Vec<SuggestAnswerItem>,
    pub page_number: usize,
    pub total_pages_count: usize,
    pub total_items_count: usize,
}

/// Cuts page `page_number` (0-based) out of the ranked answers. A page past
/// the end is empty but still reports the totals.
pub fn paginate(items: Vec<SuggestAnswerItem>, page_number: usize, page_size: usize) -> PaginatedSuggestResponse {
    let page_size = page_size.max(1);
    let total_items_count = items.len();
    let total_pages_count = total_items_count.div_ceil(page_size);
    let suggestions = items
        .into_iter()
        .skip(page_number.saturating_mul(page_size))
        .take(page_size)
        .collect();
    PaginatedSuggestResponse {
        suggestions,
        page_number,
        total_pages_count,
        total_items_count,
    }
}
