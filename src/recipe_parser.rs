//! # Recipe Document Parsing
//!
//! Splits extracted document text into ingredient and instruction sections
//! by heading detection, and converts each ingredient line into a structured
//! quantity using an ordered list of pattern matchers evaluated until the
//! first success:
//!
//! 1. size-unit lines ("1/2 medium onion, chopped")
//! 2. amount-unit-name lines ("1 1/2 cups almond flour", "1/2 tbsp of oil")
//! 3. name-amount-unit lines ("vegetable oil 2 tbsp")
//! 4. bare fallback (whole line as a name, suppressed for sub-headings)
//!
//! Amounts accept plain decimals, mixed numbers, simple fractions, and
//! unicode vulgar-fraction glyphs.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::errors::{PipelineError, PipelineResult};

/// One raw ingredient line, structurally parsed.
///
/// When `amount` is present, `unit` is present too; an empty unit string
/// means a bare count ("2 apples").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredientLine {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

/// One parsed recipe document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Defaults to 1 when the document carries no servings line
    pub servings: u32,
    pub ingredients: Vec<ParsedIngredientLine>,
    pub instructions: Vec<String>,
}

const AMOUNT_TOKEN: &str =
    r"\d+(?:\.\d+)?(?:\s+\d+/\d+)?|\d+/\d+|[¼½¾⅐⅑⅒⅓⅔⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞]";
const UNIT_TOKEN: &str =
    r"cups?|c|tablespoons?|tbsp|teaspoons?|tsp|grams?|g|kg|milliliters?|ml";
const SIZE_TOKEN: &str = r"small|medium|large|cloves?|each|whole";

lazy_static! {
    static ref ING_HEADING_RX: Regex =
        Regex::new(r"(?i)^\s*ingredients?\s*$").expect("ingredients heading pattern is valid");
    static ref STEP_HEADING_RX: Regex =
        Regex::new(r"(?i)^\s*(?:instructions?|method|directions)\s*$")
            .expect("instructions heading pattern is valid");
    static ref SERVINGS_RX: Regex =
        Regex::new(r"(?i)servings?\s*[:\-]\s*([0-9]+)").expect("servings pattern is valid");
    static ref SIZE_LINE_RX: Regex = Regex::new(&format!(
        r"(?i)^\s*[-•]?\s*({AMOUNT_TOKEN})\s*({SIZE_TOKEN})\s+(.+?)\s*$"
    ))
    .expect("size line pattern is valid");
    static ref UNIT_LINE_RX: Regex = Regex::new(&format!(
        r"(?i)^\s*[-•]?\s*({AMOUNT_TOKEN})\s*({UNIT_TOKEN})(?:\s+of)?\s+(.+?)\s*$"
    ))
    .expect("unit line pattern is valid");
    static ref TRAILING_UNIT_LINE_RX: Regex = Regex::new(&format!(
        r"(?i)^\s*[-•]?\s*(.+?)\s+({AMOUNT_TOKEN})\s*({UNIT_TOKEN})\s*$"
    ))
    .expect("trailing unit line pattern is valid");
    static ref BARE_LINE_RX: Regex =
        Regex::new(r"^\s*[-•]?\s*(.+?)\s*$").expect("bare line pattern is valid");
    static ref MIXED_NUMBER_RX: Regex =
        Regex::new(r"^(\d+)\s+(\d+)/(\d+)$").expect("mixed number pattern is valid");
    static ref SIMPLE_FRACTION_RX: Regex =
        Regex::new(r"^(\d+)/(\d+)$").expect("simple fraction pattern is valid");
    static ref SUBHEADER_HINT_RX: Regex =
        Regex::new(r"(?i)^\s*for\b|^\s*to\s+make\b|\bfilling\b|\btopping\b|\bdough\b|\bcrust\b")
            .expect("subheader hint pattern is valid");
}

/// Exact decimal values for single unicode vulgar-fraction glyphs
fn vulgar_fraction_value(c: char) -> Option<f64> {
    let value = match c {
        '¼' => 0.25,
        '½' => 0.5,
        '¾' => 0.75,
        '⅐' => 1.0 / 7.0,
        '⅑' => 1.0 / 9.0,
        '⅒' => 0.1,
        '⅓' => 1.0 / 3.0,
        '⅔' => 2.0 / 3.0,
        '⅕' => 0.2,
        '⅖' => 0.4,
        '⅗' => 0.6,
        '⅘' => 0.8,
        '⅙' => 1.0 / 6.0,
        '⅚' => 5.0 / 6.0,
        '⅛' => 0.125,
        '⅜' => 0.375,
        '⅝' => 0.625,
        '⅞' => 0.875,
        _ => return None,
    };
    Some(value)
}

/// Parse an amount token into its exact rational value.
///
/// Accepts plain decimals ("1.5"), mixed numbers ("1 1/2"), simple fractions
/// ("3/4"), and single unicode vulgar-fraction glyphs ("½"). Returns `None`
/// for anything else, which rejects the enclosing pattern and lets parsing
/// fall through to the next matcher.
pub fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();

    if let Some(caps) = MIXED_NUMBER_RX.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        let num: f64 = caps[2].parse().ok()?;
        let den: f64 = caps[3].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(whole + num / den);
    }

    if let Some(caps) = SIMPLE_FRACTION_RX.captures(text) {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }

    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(value) = vulgar_fraction_value(c) {
            return Some(value);
        }
    }

    text.parse::<f64>().ok()
}

/// Canonicalize a matched unit token (e.g. "Cups" -> "cup", "c" -> "cup")
fn canonical_unit(unit: &str) -> String {
    match unit.to_lowercase().as_str() {
        "cup" | "cups" | "c" => "cup".to_string(),
        "tablespoon" | "tablespoons" | "tbsp" => "tbsp".to_string(),
        "teaspoon" | "teaspoons" | "tsp" => "tsp".to_string(),
        "gram" | "grams" | "g" => "g".to_string(),
        "kg" => "kg".to_string(),
        "milliliter" | "milliliters" | "ml" => "ml".to_string(),
        other => other.to_string(),
    }
}

/// Decide whether a line is a section sub-heading rather than an ingredient.
///
/// Used only to suppress false positives from the bare fallback matcher.
pub fn looks_like_subheader(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() || s.chars().count() <= 2 {
        return true;
    }
    if s.ends_with(':') {
        return true;
    }
    if !s.chars().any(|c| c.is_ascii_digit()) {
        if SUBHEADER_HINT_RX.is_match(s) {
            return true;
        }
        // Title Case short lines without digits are likely headings
        let words: Vec<&str> = s.split_whitespace().collect();
        if words.len() <= 7
            && words
                .iter()
                .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        {
            return true;
        }
    }
    false
}

fn match_size_line(line: &str) -> Option<ParsedIngredientLine> {
    let caps = SIZE_LINE_RX.captures(line)?;
    let amount = parse_amount(&caps[1])?;
    let unit = match caps[2].to_lowercase().as_str() {
        "cloves" => "clove".to_string(),
        other => other.to_string(),
    };
    Some(ParsedIngredientLine {
        name: caps[3].trim().to_string(),
        amount: Some(amount),
        unit: Some(unit),
    })
}

fn match_amount_unit_line(line: &str) -> Option<ParsedIngredientLine> {
    let caps = UNIT_LINE_RX.captures(line)?;
    let amount = parse_amount(&caps[1])?;
    Some(ParsedIngredientLine {
        name: caps[3].trim().to_string(),
        amount: Some(amount),
        unit: Some(canonical_unit(&caps[2])),
    })
}

fn match_trailing_amount_unit_line(line: &str) -> Option<ParsedIngredientLine> {
    let caps = TRAILING_UNIT_LINE_RX.captures(line)?;
    let amount = parse_amount(&caps[2])?;
    Some(ParsedIngredientLine {
        name: caps[1].trim().to_string(),
        amount: Some(amount),
        unit: Some(canonical_unit(&caps[3])),
    })
}

fn match_bare_line(line: &str) -> Option<ParsedIngredientLine> {
    if looks_like_subheader(line) {
        return None;
    }
    let caps = BARE_LINE_RX.captures(line)?;
    Some(ParsedIngredientLine {
        name: caps[1].trim().to_string(),
        amount: None,
        unit: None,
    })
}

/// Ordered matcher list: first success wins
const LINE_MATCHERS: &[fn(&str) -> Option<ParsedIngredientLine>] = &[
    match_size_line,
    match_amount_unit_line,
    match_trailing_amount_unit_line,
    match_bare_line,
];

/// Parse a single ingredient line through the matcher chain.
///
/// Returns `None` for lines judged to be sub-headings or otherwise
/// unparseable; the caller silently drops those.
pub fn parse_ingredient_line(line: &str) -> Option<ParsedIngredientLine> {
    let parsed = LINE_MATCHERS.iter().find_map(|matcher| matcher(line));
    trace!(line = %line, parsed = ?parsed, "ingredient line");
    parsed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Ingredients,
    Instructions,
}

/// Parse extracted document text into a structured [`Recipe`].
///
/// Runs a state machine over the non-empty lines: an "ingredients" heading
/// switches to ingredient collection, an "instructions"/"method"/"directions"
/// heading switches to instruction collection, and a `servings: N` line sets
/// the servings count regardless of the current section. Documents without
/// headings fall back to scanning every line with the ingredient matchers.
///
/// # Errors
///
/// Returns [`PipelineError::ParseFailure`] naming `document` when no
/// ingredients are detected by either pass.
pub fn parse_recipe(text: &str, document: &str) -> PipelineResult<Recipe> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut servings: Option<u32> = None;
    let mut ingredients: Vec<ParsedIngredientLine> = Vec::new();
    let mut instructions: Vec<String> = Vec::new();
    let mut section = Section::None;

    for line in &lines {
        if let Some(caps) = SERVINGS_RX.captures(line) {
            if let Ok(n) = caps[1].parse::<u32>() {
                debug!(servings = n, "servings line detected");
                servings = Some(n);
            }
        }

        if ING_HEADING_RX.is_match(line) {
            section = Section::Ingredients;
            continue;
        }
        if STEP_HEADING_RX.is_match(line) {
            section = Section::Instructions;
            continue;
        }

        match section {
            Section::Ingredients => {
                if let Some(parsed) = parse_ingredient_line(line) {
                    ingredients.push(parsed);
                }
            }
            Section::Instructions => instructions.push(line.to_string()),
            Section::None => {}
        }
    }

    if ingredients.is_empty() {
        // Heading-guided pass found nothing; scan every line instead
        debug!(document = %document, "no headed ingredient section, falling back to full scan");
        for line in &lines {
            if let Some(parsed) = parse_ingredient_line(line) {
                ingredients.push(parsed);
            }
        }
    }

    if ingredients.is_empty() {
        return Err(PipelineError::ParseFailure {
            document: document.to_string(),
        });
    }

    info!(
        document = %document,
        ingredients = ingredients.len(),
        instructions = instructions.len(),
        servings = ?servings,
        "parsed recipe document"
    );

    Ok(Recipe {
        servings: servings.unwrap_or(1).max(1),
        ingredients,
        instructions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_decimal() {
        assert_eq!(parse_amount("2"), Some(2.0));
        assert_eq!(parse_amount("1.5"), Some(1.5));
        assert_eq!(parse_amount("0.25"), Some(0.25));
    }

    #[test]
    fn test_parse_amount_mixed_number() {
        assert_eq!(parse_amount("1 1/2"), Some(1.5));
        assert_eq!(parse_amount("2 3/4"), Some(2.75));
    }

    #[test]
    fn test_parse_amount_simple_fraction() {
        assert_eq!(parse_amount("1/2"), Some(0.5));
        assert_eq!(parse_amount("3/4"), Some(0.75));
        assert_eq!(parse_amount("1/0"), None);
    }

    #[test]
    fn test_parse_amount_vulgar_fractions() {
        assert_eq!(parse_amount("¾"), Some(0.75));
        assert_eq!(parse_amount("½"), Some(0.5));
        assert_eq!(parse_amount("⅓"), Some(1.0 / 3.0));
        assert_eq!(parse_amount("⅞"), Some(0.875));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("a pinch"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_size_line_matcher() {
        let parsed = parse_ingredient_line("1/2 medium onion, chopped").unwrap();
        assert_eq!(parsed.name, "onion, chopped");
        assert_eq!(parsed.amount, Some(0.5));
        assert_eq!(parsed.unit.as_deref(), Some("medium"));

        let parsed = parse_ingredient_line("2 large eggs").unwrap();
        assert_eq!(parsed.name, "eggs");
        assert_eq!(parsed.amount, Some(2.0));
        assert_eq!(parsed.unit.as_deref(), Some("large"));

        let parsed = parse_ingredient_line("2 cloves garlic").unwrap();
        assert_eq!(parsed.name, "garlic");
        assert_eq!(parsed.unit.as_deref(), Some("clove"));
    }

    #[test]
    fn test_amount_unit_line_matcher() {
        let parsed = parse_ingredient_line("1 1/2 cups almond flour").unwrap();
        assert_eq!(parsed.name, "almond flour");
        assert_eq!(parsed.amount, Some(1.5));
        assert_eq!(parsed.unit.as_deref(), Some("cup"));

        let parsed = parse_ingredient_line("1/2 tablespoon of vegetable oil").unwrap();
        assert_eq!(parsed.name, "vegetable oil");
        assert_eq!(parsed.amount, Some(0.5));
        assert_eq!(parsed.unit.as_deref(), Some("tbsp"));

        let parsed = parse_ingredient_line("- ½ tsp salt").unwrap();
        assert_eq!(parsed.name, "salt");
        assert_eq!(parsed.amount, Some(0.5));
        assert_eq!(parsed.unit.as_deref(), Some("tsp"));
    }

    #[test]
    fn test_trailing_amount_unit_matcher() {
        let parsed = parse_ingredient_line("vegetable oil 2 tbsp").unwrap();
        assert_eq!(parsed.name, "vegetable oil");
        assert_eq!(parsed.amount, Some(2.0));
        assert_eq!(parsed.unit.as_deref(), Some("tbsp"));
    }

    #[test]
    fn test_bare_fallback_keeps_plain_names() {
        let parsed = parse_ingredient_line("a generous handful of arugula leaves").unwrap();
        assert_eq!(parsed.name, "a generous handful of arugula leaves");
        assert_eq!(parsed.amount, None);
        assert_eq!(parsed.unit, None);
    }

    #[test]
    fn test_subheader_lines_are_dropped() {
        assert!(parse_ingredient_line("For the crust:").is_none());
        assert!(parse_ingredient_line("To make the filling").is_none());
        assert!(parse_ingredient_line("Topping").is_none());
        assert!(parse_ingredient_line("Spicy Mayo Sauce").is_none());
        assert!(parse_ingredient_line("--").is_none());
    }

    #[test]
    fn test_subheader_detection_rules() {
        assert!(looks_like_subheader(""));
        assert!(looks_like_subheader("ok"));
        assert!(looks_like_subheader("Dough:"));
        assert!(looks_like_subheader("for the glaze"));
        assert!(looks_like_subheader("Lemon Curd Filling"));
        // Digits anywhere disqualify a line from being a heading
        assert!(!looks_like_subheader("2 ripe avocados"));
        // Lower-case multi-word lines are not Title Case headings
        assert!(!looks_like_subheader("pinch of smoked paprika"));
    }

    #[test]
    fn test_parse_recipe_with_headings() {
        let text = "My Keto Bread\n\
                    Servings: 4\n\
                    Ingredients\n\
                    1 1/2 cups almond flour\n\
                    2 large eggs\n\
                    1/2 tsp salt\n\
                    Instructions\n\
                    Mix and bake.\n";
        let recipe = parse_recipe(text, "keto-bread.pdf").unwrap();
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[0].name, "almond flour");
        assert_eq!(recipe.ingredients[0].amount, Some(1.5));
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("cup"));
        assert_eq!(recipe.ingredients[1].name, "eggs");
        assert_eq!(recipe.ingredients[1].amount, Some(2.0));
        assert_eq!(recipe.ingredients[1].unit.as_deref(), Some("large"));
        assert_eq!(recipe.ingredients[2].name, "salt");
        assert_eq!(recipe.ingredients[2].amount, Some(0.5));
        assert_eq!(recipe.ingredients[2].unit.as_deref(), Some("tsp"));
        assert_eq!(recipe.instructions, vec!["Mix and bake.".to_string()]);
    }

    #[test]
    fn test_parse_recipe_servings_detected_in_any_section() {
        let text = "Ingredients\n1 cup water\nInstructions\nBoil.\nServings - 2\n";
        let recipe = parse_recipe(text, "test").unwrap();
        assert_eq!(recipe.servings, 2);
    }

    #[test]
    fn test_parse_recipe_defaults_to_one_serving() {
        let text = "Ingredients\n1 cup water\n";
        let recipe = parse_recipe(text, "test").unwrap();
        assert_eq!(recipe.servings, 1);
    }

    #[test]
    fn test_parse_recipe_fallback_scan_without_headings() {
        let text = "2 cups almond flour\n3 large eggs\n";
        let recipe = parse_recipe(text, "headless").unwrap();
        assert_eq!(recipe.ingredients.len(), 2);
    }

    #[test]
    fn test_parse_recipe_no_ingredients_is_fatal() {
        let err = parse_recipe("Just Some Title\n", "empty.pdf").unwrap_err();
        assert_eq!(
            err,
            PipelineError::ParseFailure {
                document: "empty.pdf".to_string()
            }
        );
    }
}
