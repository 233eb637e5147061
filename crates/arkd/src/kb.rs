//! Knowledge retriever - top-N grounding paragraphs by raw token overlap.

use crate::matcher;

/// Rank KB paragraphs by raw overlap count with `message` and return the top
/// `max_snippets`. Zero-overlap paragraphs are dropped; equal counts keep
/// source order (stable sort).
pub fn retrieve(message: &str, paragraphs: &[String], max_snippets: usize) -> Vec<String> {
    let query_tokens = matcher::tokenize(message);
    if query_tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &String)> = paragraphs
        .iter()
        .filter_map(|paragraph| {
            let count = matcher::overlap(&query_tokens, paragraph);
            (count > 0).then_some((count, paragraph))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(max_snippets)
        .map(|(_, paragraph)| paragraph.clone())
        .collect()
}
