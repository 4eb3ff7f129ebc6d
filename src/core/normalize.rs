// src/core/normalize.rs

/// Trie key form of a display string: lowercased, every non-alphanumeric
/// character folded to a space, whitespace runs collapsed.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replaces punctuation with spaces but keeps case and whitespace, so the
/// highlighter can split the user's input into fields.
pub fn alpha_normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect()
}

/// Canonical form for class names.
pub fn lower_normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
