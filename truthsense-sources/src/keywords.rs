//! Keyword extraction for upstream search queries.
//!
//! User claims arrive as full sentences ("is it true that ...?"); both
//! search APIs do better with bare keywords, so we strip filler words and
//! verification vocabulary before querying.

const STOP_WORDS: &[&str] = &[
    "is", "are", "was", "were", "what", "when", "where", "who", "why", "how", "can", "could",
    "would", "should", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
    "with", "by", "this", "that", "these", "those", "true", "false", "real", "fake", "check",
    "verify", "claim",
];

const MAX_KEYWORDS: usize = 5;

/// Extract up to five content-bearing keywords from a free-form query.
///
/// Punctuation is dropped, words of two characters or fewer are dropped,
/// and stop words (including verification vocabulary like "true"/"fake")
/// are removed.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Join extracted keywords into the query string sent upstream.
pub fn create_search_query(query: &str) -> String {
    extract_keywords(query).join(" ")
}
