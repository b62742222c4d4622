use serde::{Deserialize, Serialize};

use crate::interpret::{FilterSet, FilterSource};

/// A single catalog entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub selling_price: f64,
    pub actual_price: f64,
    pub average_rating: f64,
    pub discount: Option<String>,
    pub seller: Option<String>,
    pub url: Option<String>,
    pub out_of_stock: bool,
    pub description: Option<String>,
    /// Flattened free-text product details ("key value key value ...")
    pub details: Option<String>,
}

/// A product returned by the search executor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductHit {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub category: String,
    pub sub_category: String,
    pub selling_price: f64,
    pub actual_price: f64,
    pub average_rating: f64,
    pub discount: String,
    pub url: String,
    pub score: f32,
}

/// Interpret request
#[derive(Debug, Clone, Deserialize)]
pub struct InterpretRequest {
    pub query: String,
}

/// Interpret response
#[derive(Debug, Clone, Serialize)]
pub struct InterpretResponse {
    pub query: String,
    pub filters: FilterSet,
    pub source: FilterSource,
}

/// Search request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Overrides the configured result cap (clamped to 1..=10)
    pub limit: Option<usize>,
}

/// Search response: filters, matching products and the assistant's answer
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub filters: FilterSet,
    pub source: FilterSource,
    pub results: Vec<ProductHit>,
    pub response: String,
}

/// Public view of the running configuration (API key never echoed)
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub use_learned_path: bool,
    pub provider: String,
    pub base_url: String,
    pub chat_model: String,
    pub has_api_key: bool,
    pub search_limit: usize,
}
