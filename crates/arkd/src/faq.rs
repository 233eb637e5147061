//! FAQ resolver - single best entry above the confidence threshold.

use crate::matcher;
use crate::sources::FaqEntry;

/// Best-scoring FAQ answer for `message`, if it clears `threshold`.
///
/// Only a strict improvement replaces the current best, so ties keep the
/// earliest entry in file order.
pub fn resolve(message: &str, entries: &[FaqEntry], threshold: f64) -> Option<String> {
    let mut best_score = 0.0;
    let mut best: Option<&FaqEntry> = None;

    for entry in entries {
        let s = matcher::score(message, &entry.question);
        if s > best_score {
            best_score = s;
            best = Some(entry);
        }
    }

    if best_score >= threshold {
        best.map(|entry| entry.answer.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(question: &str, answer: &str) -> FaqEntry {
        FaqEntry {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let entries = vec![entry("What are your hours", "8am to 10pm")];

        // 1 of 3 query tokens overlaps -> 0.333, below 0.35
        assert_eq!(resolve("are prices fixed", &entries, 0.35), None);

        // 2 of 3 overlap -> 0.667, above 0.35
        assert_eq!(
            resolve("what hours today", &entries, 0.35),
            Some("8am to 10pm".to_string())
        );
    }

    #[test]
    fn test_score_exactly_at_threshold_matches() {
        let entries = vec![entry("delivery coverage", "All of Kuwait")];
        // 1 of 2 query tokens -> 0.5, threshold 0.5 is inclusive
        assert_eq!(
            resolve("delivery cost", &entries, 0.5),
            Some("All of Kuwait".to_string())
        );
    }

    #[test]
    fn test_tie_keeps_first_entry() {
        let entries = vec![
            entry("opening hours", "first answer"),
            entry("opening hours today", "second answer"),
        ];
        // Both score 1.0 for this query; the earlier entry wins.
        assert_eq!(
            resolve("opening hours", &entries, 0.35),
            Some("first answer".to_string())
        );
    }

    #[test]
    fn test_no_entries() {
        assert_eq!(resolve("anything", &[], 0.35), None);
    }

    #[test]
    fn test_empty_message_never_matches() {
        let entries = vec![entry("hours", "8am")];
        assert_eq!(resolve("", &entries, 0.0), None);
        assert_eq!(resolve("   ", &entries, 0.35), None);
    }
}
