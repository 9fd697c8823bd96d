//! # Ingredient Name Normalization
//!
//! Canonicalizes free-text ingredient names for table lookups. Raw recipe
//! lines carry preparation clauses ("onion, chopped"), parentheticals
//! ("flour (sifted)") and descriptive adjectives that would defeat exact or
//! fuzzy key matching, so every lookup path runs names through
//! [`normalize_name`] first.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PAREN_RX: Regex = Regex::new(r"\(.*?\)").expect("parenthetical pattern is valid");
    static ref DESCRIPTOR_RX: Regex =
        Regex::new(r"(?i)\b(chopped|minced|diced|sliced|fresh|raw|peeled|ground)\b")
            .expect("descriptor pattern is valid");
    static ref WHITESPACE_RX: Regex = Regex::new(r"\s+").expect("whitespace pattern is valid");
}

/// Normalize a free-text ingredient name for lookup.
///
/// Removes parenthesized substrings, truncates at the first comma, strips a
/// fixed set of descriptive words as whole-word case-insensitive matches,
/// collapses internal whitespace, and lower-cases. Always returns a string,
/// possibly empty.
///
/// # Examples
///
/// ```rust
/// use nutrigen::normalize::normalize_name;
///
/// assert_eq!(normalize_name("Onion, chopped"), "onion");
/// assert_eq!(normalize_name("almond flour (blanched)"), "almond flour");
/// assert_eq!(normalize_name("fresh ground black pepper"), "black pepper");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let no_parens = PAREN_RX.replace_all(&lowered, "");
    let head = no_parens.split(',').next().unwrap_or("");
    let no_descriptors = DESCRIPTOR_RX.replace_all(head, "");
    WHITESPACE_RX
        .replace_all(no_descriptors.trim(), " ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_at_first_comma() {
        assert_eq!(normalize_name("onion, peeled and diced"), "onion");
        assert_eq!(normalize_name("butter, softened, cubed"), "butter");
    }

    #[test]
    fn test_strips_parentheticals() {
        assert_eq!(normalize_name("flour (all-purpose)"), "flour");
        assert_eq!(normalize_name("eggs (room temperature) large"), "eggs large");
    }

    #[test]
    fn test_removes_descriptive_words() {
        assert_eq!(normalize_name("chopped fresh cilantro"), "cilantro");
        assert_eq!(normalize_name("Ground Cumin seeds"), "cumin seeds");
    }

    #[test]
    fn test_descriptor_only_inside_words_is_kept() {
        // "ground" must match as a whole word only
        assert_eq!(normalize_name("groundnut oil"), "groundnut oil");
    }

    #[test]
    fn test_collapses_whitespace_and_lowercases() {
        assert_eq!(normalize_name("  Olive   Oil  "), "olive oil");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("chopped"), "");
    }
}
