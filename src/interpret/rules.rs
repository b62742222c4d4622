//! Deterministic, vocabulary-driven query interpretation.
//!
//! Steps run in a fixed order over the lower-cased query: color, product
//! type, brand, price range, gender, attributes. A field that does not
//! match stays `None`.

use regex::Regex;
use std::sync::LazyLock;

use super::filters::{FilterSet, Gender};
use super::fuzzy::partial_ratio;
use super::vocabulary::{is_gender_term, Vocabulary, GENDER_TERMS};

/// Price-sentiment words always checked as attributes.
pub const EXTRA_ATTRIBUTES: &[&str] = &["cheap", "expensive"];

static PRICE_UNDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bunder\s+\$?\s*(\d[\d,]*)").expect("Invalid price-under regex")
});

static PRICE_OVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:over|above|more\s+than)\s+\$?\s*(\d[\d,]*)")
        .expect("Invalid price-over regex")
});

static PRICE_BETWEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bbetween\s+\$?\s*(\d[\d,]*)\s+(?:and|to)\s+\$?\s*(\d[\d,]*)")
        .expect("Invalid price-between regex")
});

/// Minimum partial-ratio scores (exclusive) for fuzzy fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub product_type: f64,
    pub brand: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            product_type: 80.0,
            brand: 80.0,
        }
    }
}

/// Interpret `query` with the default thresholds.
pub fn interpret(query: &str, vocabulary: &Vocabulary) -> FilterSet {
    interpret_with(query, vocabulary, Thresholds::default())
}

pub fn interpret_with(query: &str, vocabulary: &Vocabulary, thresholds: Thresholds) -> FilterSet {
    let text = query.to_lowercase();
    let (price_min, price_max) = match_price(&text);

    let filters = FilterSet {
        color: match_color(&text, vocabulary),
        product_type: best_fuzzy_match(
            &text,
            vocabulary.types().iter().filter(|t| !is_gender_term(t)),
            thresholds.product_type,
        ),
        brand: best_fuzzy_match(
            &text,
            vocabulary.brands().iter().filter(|b| !b.trim().is_empty()),
            thresholds.brand,
        ),
        price_min,
        price_max,
        gender: match_gender(&text),
        attributes: match_attributes(&text, vocabulary),
    };

    tracing::debug!("Rule-based filters for {query:?}: {filters:?}");
    filters
}

/// First vocabulary color occurring as a whole word.
fn match_color(text: &str, vocabulary: &Vocabulary) -> Option<String> {
    vocabulary
        .colors()
        .iter()
        .find(|color| contains_whole_word(text, color))
        .cloned()
}

/// Highest-scoring candidate above `threshold`; the earliest wins ties.
fn best_fuzzy_match<'a>(
    text: &str,
    candidates: impl Iterator<Item = &'a String>,
    threshold: f64,
) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;

    for candidate in candidates {
        let score = partial_ratio(candidate, text);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.filter(|(_, score)| *score > threshold)
        .map(|(candidate, _)| candidate.clone())
}

/// Apply the first matching price pattern: under, over/above/more than, between.
fn match_price(text: &str) -> (Option<f64>, Option<f64>) {
    if let Some(caps) = PRICE_UNDER.captures(text) {
        return (None, parse_amount(&caps[1]));
    }
    if let Some(caps) = PRICE_OVER.captures(text) {
        return (parse_amount(&caps[1]), None);
    }
    if let Some(caps) = PRICE_BETWEEN.captures(text) {
        return (parse_amount(&caps[1]), parse_amount(&caps[2]));
    }
    (None, None)
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<u64>().ok().map(|n| n as f64)
}

fn match_gender(text: &str) -> Option<Gender> {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    GENDER_TERMS
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| words.contains(t)))
        .map(|(gender, _)| *gender)
}

fn match_attributes(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let extras = EXTRA_ATTRIBUTES
        .iter()
        .filter(|extra| !vocabulary.attributes().iter().any(|a| a == *extra))
        .map(|extra| extra.to_string());

    vocabulary
        .attributes()
        .iter()
        .cloned()
        .chain(extras)
        .filter(|term| text.contains(term.as_str()))
        .collect()
}

/// Substring match delimited by non-word characters (or the string edges).
pub fn contains_whole_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';

    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
