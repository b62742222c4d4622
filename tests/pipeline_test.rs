//! Integration tests for the shopping pipeline.
//!
//! These tests load a small catalog from disk, build the vocabulary and the
//! search index, and run queries through interpretation and search without
//! requiring a running LLM.

use std::path::PathBuf;

use shop_assist::api::search::run_search;
use shop_assist::catalog::load_catalog;
use shop_assist::config::Config;
use shop_assist::interpret::rules;
use shop_assist::interpret::{FilterSet, FilterSource, Gender, Vocabulary};
use shop_assist::models::Product;
use shop_assist::search::catalog_index::CatalogIndex;
use shop_assist::state::AppState;

/// Helper: a catalog in the dataset's on-disk format.
const SAMPLE_CATALOG: &str = r#"[
    {
        "_id": "p1",
        "title": "Solid Men Black Polo T-Shirt",
        "brand": "York",
        "category": "Clothing and Accessories",
        "sub_category": "Topwear",
        "selling_price": "499",
        "actual_price": "1,299",
        "average_rating": "4.1",
        "discount": "61% off",
        "product_details": [{"Fabric": "Pure Cotton"}, {"Sleeve": "Half Sleeve"}]
    },
    {
        "_id": "p2",
        "title": "Printed Women Red Kurta",
        "brand": "Biba",
        "category": "Clothing and Accessories",
        "sub_category": "Topwear",
        "selling_price": "1,199",
        "actual_price": "2,499",
        "average_rating": "4.4",
        "discount": "52% off",
        "product_details": [{"Fabric": "Rayon"}, {"Sleeve": "Full Sleeve"}]
    },
    {
        "_id": "p3",
        "title": "Slim Men Blue Jeans",
        "brand": "Levis",
        "category": "Clothing and Accessories",
        "sub_category": "Bottomwear",
        "selling_price": "2,299",
        "actual_price": "3,299",
        "average_rating": "4.0",
        "product_details": [{"Fabric": "Cotton Blend"}, {"Fit": "Slim"}]
    },
    {
        "_id": "p4",
        "title": "Solid Women Black Track Pants",
        "brand": "York",
        "category": "Clothing and Accessories",
        "sub_category": "Bottomwear",
        "selling_price": 899,
        "actual_price": 1999,
        "average_rating": 3.8,
        "product_details": [{"Fabric": "Cotton Blend"}, {"Closure": "Elastic"}]
    },
    {
        "_id": "p5",
        "title": "Navy Running Sneakers",
        "brand": "Puma",
        "category": "Footwear",
        "sub_category": "Sports Shoes",
        "selling_price": "3,999",
        "actual_price": "5,999",
        "average_rating": "4.3",
        "product_details": [{"Sole": "Rubber"}]
    }
]"#;

fn write_catalog(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, SAMPLE_CATALOG).unwrap();
    path
}

fn load_sample(dir: &tempfile::TempDir) -> Vec<Product> {
    load_catalog(&write_catalog(dir)).unwrap()
}

fn build_index(dir: &tempfile::TempDir, products: &[Product]) -> CatalogIndex {
    let index = CatalogIndex::open_or_create(&dir.path().join("index")).unwrap();
    index.rebuild(products).unwrap();
    index
}

#[test]
fn test_catalog_loads_and_builds_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    assert_eq!(products.len(), 5);
    assert_eq!(products[1].selling_price, 1199.0);
    assert_eq!(products[3].average_rating, 3.8);

    let vocab = Vocabulary::load(&products, 30);
    assert!(vocab.has_type("topwear"));
    assert!(vocab.has_type("Solid Men Black Polo T-Shirt"));
    assert!(vocab.has_brand("levis"));
    assert!(vocab.colors().iter().any(|c| c == "navy"));
    // "fabric" and "sleeve" tie on frequency; first seen wins
    assert_eq!(vocab.attributes()[0], "fabric");
    assert_eq!(vocab.attributes()[1], "sleeve");
    assert!(vocab.attributes().iter().any(|a| a == "cotton"));
}

#[test]
fn test_missing_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_catalog(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_rules_interpret_query_against_loaded_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let vocab = Vocabulary::load(&products, 30);

    let filters = rules::interpret("Black cotton top for women under 1,000", &vocab);
    assert_eq!(filters.color.as_deref(), Some("black"));
    assert_eq!(filters.gender, Some(Gender::Women));
    assert_eq!(filters.price_min, None);
    assert_eq!(filters.price_max, Some(1000.0));
    assert!(filters.attributes.iter().any(|a| a == "cotton"));

    let brand = rules::interpret("something from levis", &vocab);
    assert_eq!(brand.brand.as_deref(), Some("levis"));
}

#[test]
fn test_strict_filters_match_every_value() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let filters = FilterSet {
        color: Some("black".into()),
        brand: Some("york".into()),
        gender: Some(Gender::Women),
        ..FilterSet::default()
    };
    let hits = index.search(&filters, "black york for women", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p4");
    assert_eq!(hits[0].selling_price, 899.0);
    assert_eq!(hits[0].brand, "York");
}

#[test]
fn test_gender_token_does_not_match_inside_women() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let filters = FilterSet {
        color: Some("black".into()),
        gender: Some(Gender::Men),
        ..FilterSet::default()
    };
    let hits = index.search(&filters, "black for men", 5).unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["p1"]);
}

#[test]
fn test_price_range_is_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let filters = FilterSet {
        price_min: Some(499.0),
        price_max: Some(1199.0),
        ..FilterSet::default()
    };
    let hits = index.search(&filters, "between 499 and 1199", 10).unwrap();
    let mut ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["p1", "p2", "p4"]);
}

#[test]
fn test_unmatched_combination_relaxes_to_any_value() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    // No red sneakers in the catalog: either value alone is enough
    let filters = FilterSet {
        color: Some("red".into()),
        product_type: Some("sneakers".into()),
        ..FilterSet::default()
    };
    let hits = index.search(&filters, "red sneakers", 5).unwrap();
    let mut ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["p2", "p5"]);
}

#[test]
fn test_relaxation_keeps_price_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let filters = FilterSet {
        color: Some("red".into()),
        product_type: Some("sneakers".into()),
        price_max: Some(2000.0),
        ..FilterSet::default()
    };
    let hits = index.search(&filters, "red sneakers under 2000", 5).unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["p2"]);
}

#[test]
fn test_unconstrained_filters_fall_back_to_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let hits = index.search(&FilterSet::default(), "rubber running", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p5");

    assert!(index.search(&FilterSet::default(), "   ", 5).unwrap().is_empty());
}

#[test]
fn test_limit_caps_results() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let filters = FilterSet {
        price_min: Some(0.0),
        ..FilterSet::default()
    };
    let hits = index.search(&filters, "anything", 2).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn test_rebuild_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let products = load_sample(&dir);
    let index = build_index(&dir, &products);

    let kurta = FilterSet {
        product_type: Some("kurta".into()),
        ..FilterSet::default()
    };
    assert_eq!(index.search(&kurta, "kurta", 5).unwrap().len(), 1);

    index.rebuild(&products[2..]).unwrap();
    assert!(index.search(&kurta, "kurta", 5).unwrap().is_empty());

    // Reopening the on-disk index sees the rebuilt contents
    let reopened = CatalogIndex::open_or_create(&dir.path().join("index")).unwrap();
    let jeans = FilterSet {
        product_type: Some("jeans".into()),
        ..FilterSet::default()
    };
    assert_eq!(reopened.search(&jeans, "jeans", 5).unwrap().len(), 1);
}

#[tokio::test]
async fn test_full_pipeline_with_rule_based_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        catalog_path: write_catalog(&dir),
        data_dir: dir.path().join("data"),
        generate_responses: false,
        ..Config::default()
    };
    let state = AppState::new(config).unwrap();

    let resp = run_search(&state, "black track pants for women under 1000", 5)
        .await
        .unwrap();
    assert_eq!(resp.source, FilterSource::Rules);
    assert_eq!(resp.filters.color.as_deref(), Some("black"));
    assert_eq!(resp.filters.gender, Some(Gender::Women));
    assert_eq!(resp.filters.price_max, Some(1000.0));
    assert!(!resp.results.is_empty());
    assert!(resp.results.iter().all(|h| h.selling_price <= 1000.0));
    assert!(resp.response.starts_with("Here are"));
}

#[tokio::test]
async fn test_pipeline_reports_no_results_kindly() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        catalog_path: write_catalog(&dir),
        data_dir: dir.path().join("data"),
        generate_responses: false,
        ..Config::default()
    };
    let state = AppState::new(config).unwrap();

    let resp = run_search(&state, "anything over 100000", 5).await.unwrap();
    assert_eq!(resp.filters.price_min, Some(100000.0));
    assert!(resp.results.is_empty());
    assert!(resp.response.starts_with("Sorry"));
}

#[test]
fn test_app_state_requires_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        catalog_path: dir.path().join("missing.json"),
        data_dir: dir.path().join("data"),
        ..Config::default()
    };
    let err = AppState::new(config).err().unwrap();
    assert!(err.to_string().contains("Catalog unavailable"));
}
