//! Closed matching vocabulary built from the catalog snapshot.
//!
//! Colors come from the CSS keyword table. Product types and brands are
//! normalized catalog values in first-seen order, and attribute candidates
//! are the most frequent product-detail tokens.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::colors::CSS_COLOR_NAMES;
use super::filters::Gender;
use crate::models::Product;

/// Surface terms per gender, in priority order.
pub const GENDER_TERMS: &[(Gender, &[&str])] = &[
    (Gender::Men, &["men", "male", "man", "boys", "boy"]),
    (Gender::Women, &["women", "female", "woman", "girls", "girl"]),
    (Gender::Unisex, &["unisex"]),
];

/// Attribute candidates used when the catalog has no detail text.
pub const CURATED_ATTRIBUTES: &[&str] = &["comfortable", "discount", "best rated", "cheap"];

static DETAIL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z-]{4,}").expect("Invalid detail token regex"));

/// Closed matching vocabulary, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    colors: Vec<String>,
    types: Vec<String>,
    brands: Vec<String>,
    attributes: Vec<String>,
}

impl Vocabulary {
    /// Build the vocabulary from a catalog snapshot.
    ///
    /// Types are every category, then every sub-category, then every title;
    /// brands come from the brand field. Attribute candidates are the `attribute_top_n` most
    /// frequent detail tokens, or [`CURATED_ATTRIBUTES`] when no product
    /// carries detail text.
    pub fn load(products: &[Product], attribute_top_n: usize) -> Self {
        let type_values = products
            .iter()
            .filter_map(|p| p.category.as_deref())
            .chain(products.iter().filter_map(|p| p.sub_category.as_deref()))
            .chain(products.iter().filter_map(|p| p.title.as_deref()));
        let brand_values = products.iter().filter_map(|p| p.brand.as_deref());

        let details: Vec<&str> = products
            .iter()
            .filter_map(|p| p.details.as_deref())
            .filter(|d| !d.trim().is_empty())
            .collect();

        let attributes = if details.is_empty() {
            CURATED_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
        } else {
            top_detail_tokens(&details, attribute_top_n)
        };

        let vocabulary = Self {
            colors: CSS_COLOR_NAMES.iter().map(|s| s.to_string()).collect(),
            types: normalize_terms(type_values),
            brands: normalize_terms(brand_values),
            attributes,
        };

        tracing::info!(
            "Vocabulary loaded: {} types, {} brands, {} attributes, {} colors",
            vocabulary.types.len(),
            vocabulary.brands.len(),
            vocabulary.attributes.len(),
            vocabulary.colors.len()
        );

        vocabulary
    }

    /// Build a vocabulary from explicit term lists.
    ///
    /// Types and brands go through the same normalization as [`Vocabulary::load`];
    /// attributes are lower-cased and deduplicated.
    pub fn from_terms<T, B, A>(types: T, brands: B, attributes: A) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let types: Vec<String> = types.into_iter().map(|s| s.as_ref().to_string()).collect();
        let brands: Vec<String> = brands.into_iter().map(|s| s.as_ref().to_string()).collect();

        let mut seen = HashSet::new();
        let attributes = attributes
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        Self {
            colors: CSS_COLOR_NAMES.iter().map(|s| s.to_string()).collect(),
            types: normalize_terms(types.iter().map(String::as_str)),
            brands: normalize_terms(brands.iter().map(String::as_str)),
            attributes,
        }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn has_type(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        self.types.iter().any(|t| *t == value)
    }

    pub fn has_brand(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        self.brands.iter().any(|b| *b == value)
    }
}

/// True if `term` is one of the fixed gender surface terms.
pub fn is_gender_term(term: &str) -> bool {
    GENDER_TERMS
        .iter()
        .any(|(_, terms)| terms.contains(&term))
}

/// Lower-case, trim, drop entries of 2 chars or fewer, dedup keeping first-seen order.
fn normalize_terms<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .map(|v| v.trim().to_lowercase())
        .filter(|v| v.chars().count() > 2)
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Most frequent detail tokens; ties keep first-seen order.
fn top_detail_tokens(details: &[&str], top_n: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;

    for text in details {
        for m in DETAIL_TOKEN.find_iter(text) {
            let token = m.as_str().to_lowercase();
            let entry = counts.entry(token).or_insert_with(|| {
                order += 1;
                (0, order)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(token, _)| token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str, brand: Option<&str>, details: Option<&str>) -> Product {
        Product {
            id: title.to_string(),
            title: Some(title.to_string()),
            brand: brand.map(String::from),
            category: Some("Clothing and Accessories".to_string()),
            sub_category: Some("Topwear".to_string()),
            details: details.map(String::from),
            ..Product::default()
        }
    }

    #[test]
    fn test_load_normalizes_and_dedups_types() {
        let products = vec![
            product("  Solid Men Polo  ", Some("York"), None),
            product("solid men polo", Some("york"), None),
            product("XL", None, None),
        ];
        let vocab = Vocabulary::load(&products, 30);
        assert_eq!(
            vocab.types(),
            &[
                "clothing and accessories".to_string(),
                "topwear".to_string(),
                "solid men polo".to_string(),
            ]
        );
        assert_eq!(vocab.brands(), &["york".to_string()]);
    }

    #[test]
    fn test_types_list_categories_then_sub_categories_then_titles() {
        let products = vec![
            Product {
                id: "a".into(),
                category: Some("Clothing".into()),
                sub_category: Some("Bottomwear".into()),
                title: Some("Cotton Track Pants".into()),
                ..Product::default()
            },
            Product {
                id: "b".into(),
                category: Some("Sportswear".into()),
                sub_category: Some("Track Pants".into()),
                title: Some("Men Joggers".into()),
                ..Product::default()
            },
        ];
        let vocab = Vocabulary::load(&products, 30);
        assert_eq!(
            vocab.types(),
            &[
                "clothing",
                "sportswear",
                "bottomwear",
                "track pants",
                "cotton track pants",
                "men joggers",
            ]
        );
    }

    #[test]
    fn test_short_brands_are_dropped() {
        let products = vec![product("Kurta", Some("HM"), None), product("Shirt", Some("  "), None)];
        let vocab = Vocabulary::load(&products, 30);
        assert!(vocab.brands().is_empty());
    }

    #[test]
    fn test_curated_attributes_without_details() {
        let vocab = Vocabulary::load(&[product("Kurta", None, None)], 30);
        assert_eq!(vocab.attributes(), CURATED_ATTRIBUTES);
    }

    #[test]
    fn test_attributes_from_detail_frequency() {
        let products = vec![
            product("a", None, Some("Fabric Cotton Pattern Solid")),
            product("b", None, Some("Fabric Cotton Pattern Printed")),
            product("c", None, Some("Fabric Polyester slim-fit")),
        ];
        let vocab = Vocabulary::load(&products, 3);
        assert_eq!(vocab.attributes(), &["fabric", "cotton", "pattern"]);
    }

    #[test]
    fn test_detail_tokens_keep_hyphens_and_skip_short_runs() {
        let tokens = top_detail_tokens(&["slim-fit Neck: V, Sleeve 3/4"], 10);
        assert_eq!(tokens, vec!["slim-fit", "neck", "sleeve"]);
    }

    #[test]
    fn test_colors_loaded_in_table_order() {
        let vocab = Vocabulary::from_terms(["dresses"], ["adidas"], ["cheap"]);
        assert_eq!(vocab.colors().first().map(String::as_str), Some("aliceblue"));
        assert!(vocab.colors().iter().any(|c| c == "red"));
    }

    #[test]
    fn test_membership_is_case_insensitive() {
        let vocab = Vocabulary::from_terms(["Dresses"], ["Adidas"], Vec::<&str>::new());
        assert!(vocab.has_type(" dresses"));
        assert!(vocab.has_brand("ADIDAS"));
        assert!(!vocab.has_brand("puma"));
    }

    #[test]
    fn test_gender_terms() {
        assert!(is_gender_term("women"));
        assert!(is_gender_term("boy"));
        assert!(!is_gender_term("kids"));
    }
}
