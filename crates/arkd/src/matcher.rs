//! Lexical matching - tokenization and overlap scoring.
//!
//! Tokens are maximal runs of word characters, covering both ASCII and the
//! Arabic block so mixed-script customer messages match either corpus.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w\x{0600}-\x{06FF}]+").expect("valid token regex"));

/// Lowercase word tokens of `text`. Empty or whitespace-only input yields an
/// empty set.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Overlap score in [0,1]: shared tokens normalized by the query's token
/// count. Deliberately asymmetric - long candidates are not penalized.
pub fn score(query: &str, candidate: &str) -> f64 {
    let query_tokens = tokenize(query);
    let candidate_tokens = tokenize(candidate);
    if query_tokens.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }
    let shared = query_tokens.intersection(&candidate_tokens).count();
    shared as f64 / query_tokens.len() as f64
}

/// Raw count of query tokens appearing in `candidate` (used for KB ranking,
/// where paragraph lengths vary too widely for normalized scores).
pub fn overlap(query_tokens: &HashSet<String>, candidate: &str) -> usize {
    tokenize(candidate)
        .intersection(query_tokens)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_tokenize_case_insensitive() {
        assert_eq!(tokenize("Hi"), tokenize("hi"));
        assert_eq!(tokenize("OPENING Hours"), tokenize("opening hours"));
    }

    #[test]
    fn test_tokenize_arabic() {
        let tokens = tokenize("شنو أوقات الدوام؟");
        assert!(tokens.contains("شنو"));
        assert!(tokens.contains("أوقات"));
        assert!(tokens.contains("الدوام"));
        assert!(!tokens.contains("؟"));
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens = tokenize("hours? open-today!");
        assert!(tokens.contains("hours"));
        assert!(tokens.contains("open"));
        assert!(tokens.contains("today"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_score_empty_sides() {
        assert_eq!(score("", "anything"), 0.0);
        assert_eq!(score("anything", ""), 0.0);
    }

    #[test]
    fn test_score_normalized_by_query() {
        // 2 of 3 query tokens overlap
        let s = score("what are hours", "what are your opening hours today");
        assert!((s - 1.0).abs() < 1e-9, "all 3 query tokens present: {}", s);

        let s = score("delivery price today", "delivery available");
        assert!((s - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_counts_shared_tokens() {
        let query = tokenize("coffee beans price");
        assert_eq!(overlap(&query, "our coffee beans are roasted daily"), 2);
        assert_eq!(overlap(&query, "tea selection"), 0);
    }
}
