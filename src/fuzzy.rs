//! # Fuzzy Name Matching
//!
//! String-similarity scoring used when an ingredient name does not exactly
//! match a table key ("chilli powder" vs "chili powder"). The scorer is a
//! trait so resolver components take it as an injected dependency; any
//! implementation preserving the 0..=100 scale and threshold semantics can be
//! substituted.

use tracing::trace;

/// Scores how similar two names are, on a 0..=100 scale.
///
/// 100 means identical after case folding; 0 means nothing in common.
pub trait SimilarityScorer {
    fn score(&self, query: &str, candidate: &str) -> u8;
}

/// Default scorer with token-sorted weighted-ratio semantics.
///
/// Computes a Levenshtein similarity ratio on the case-folded strings and on
/// their token-sorted forms, and returns the higher of the two. Token sorting
/// makes word order irrelevant ("flour almond" scores 100 against
/// "almond flour").
#[derive(Debug, Clone, Default)]
pub struct TokenSortScorer;

impl TokenSortScorer {
    pub fn new() -> Self {
        Self
    }

    /// Sort whitespace-separated tokens alphabetically and rejoin
    fn token_sort(s: &str) -> String {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }

    /// Levenshtein similarity ratio scaled to 0..=100
    fn ratio(s1: &str, s2: &str) -> u8 {
        let max_len = s1.chars().count().max(s2.chars().count());
        if max_len == 0 {
            return 100;
        }
        let distance = levenshtein_distance(s1, s2);
        let ratio = 100.0 * (1.0 - distance as f64 / max_len as f64);
        ratio.round().clamp(0.0, 100.0) as u8
    }
}

impl SimilarityScorer for TokenSortScorer {
    fn score(&self, query: &str, candidate: &str) -> u8 {
        let q = query.to_lowercase();
        let c = candidate.to_lowercase();

        let plain = Self::ratio(&q, &c);
        let sorted = Self::ratio(&Self::token_sort(&q), &Self::token_sort(&c));
        let score = plain.max(sorted);

        trace!(query = %query, candidate = %candidate, score, "similarity score");
        score
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    #[allow(clippy::needless_range_loop)]
    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                0
            } else {
                1
            };

            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

/// Find the highest-scoring key in `keys` at or above `threshold`.
///
/// Returns `None` when no key reaches the threshold; a key scoring exactly at
/// the threshold is accepted. Candidates are scanned in sorted order and ties
/// keep the earlier key, so equal scores always resolve to the
/// lexicographically smallest candidate.
pub fn best_match<'a, S: SimilarityScorer + ?Sized>(
    scorer: &S,
    query: &str,
    keys: impl IntoIterator<Item = &'a String>,
    threshold: u8,
) -> Option<&'a String> {
    let mut keys: Vec<&'a String> = keys.into_iter().collect();
    keys.sort_unstable();

    let mut best: Option<(&'a String, u8)> = None;
    for key in keys {
        let score = scorer.score(query, key);
        if score >= threshold && best.map_or(true, |(_, s)| score > s) {
            best = Some((key, score));
        }
    }
    best.map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_100() {
        let scorer = TokenSortScorer::new();
        assert_eq!(scorer.score("salt", "salt"), 100);
        assert_eq!(scorer.score("Salt", "salt"), 100);
    }

    #[test]
    fn test_token_order_is_irrelevant() {
        let scorer = TokenSortScorer::new();
        assert_eq!(scorer.score("flour almond", "almond flour"), 100);
    }

    #[test]
    fn test_single_edit_scores_high() {
        let scorer = TokenSortScorer::new();
        // "chilli powder" vs "chili powder": one deletion over 13 chars
        assert!(scorer.score("chilli powder", "chili powder") >= 92);
    }

    #[test]
    fn test_unrelated_strings_score_low() {
        let scorer = TokenSortScorer::new();
        assert!(scorer.score("salt", "almond flour") < 50);
    }

    #[test]
    fn test_best_match_threshold_boundary() {
        // Fixed-score scorer to probe the exact threshold boundary
        struct Fixed(u8);
        impl SimilarityScorer for Fixed {
            fn score(&self, _: &str, _: &str) -> u8 {
                self.0
            }
        }

        let keys = vec!["salt".to_string()];
        assert!(best_match(&Fixed(92), "x", &keys, 92).is_some());
        assert!(best_match(&Fixed(91), "x", &keys, 92).is_none());
    }

    #[test]
    fn test_best_match_tie_breaks_lexicographically() {
        struct Fixed(u8);
        impl SimilarityScorer for Fixed {
            fn score(&self, _: &str, _: &str) -> u8 {
                self.0
            }
        }

        // every key scores the same; the result must not depend on the
        // order the keys come in
        let keys = vec!["onion powder".to_string(), "garlic powder".to_string()];
        let reversed = vec!["garlic powder".to_string(), "onion powder".to_string()];
        assert_eq!(
            best_match(&Fixed(95), "x", &keys, 92),
            Some(&"garlic powder".to_string())
        );
        assert_eq!(
            best_match(&Fixed(95), "x", &reversed, 92),
            Some(&"garlic powder".to_string())
        );
    }

    #[test]
    fn test_best_match_takes_highest_scorer() {
        let scorer = TokenSortScorer::new();
        let keys = vec!["onion powder".to_string(), "garlic powder".to_string()];
        let hit = best_match(&scorer, "garlic powdr", keys.iter(), 85);
        assert_eq!(hit, Some(&"garlic powder".to_string()));
    }

    #[test]
    fn test_empty_strings() {
        let scorer = TokenSortScorer::new();
        assert_eq!(scorer.score("", ""), 100);
        assert_eq!(scorer.score("salt", ""), 0);
    }
}
