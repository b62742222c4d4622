//! Catalog snapshot loading from the JSON product dataset.
//!
//! The dataset is either a top-level array of product objects or an object
//! wrapping that array under `root`. Prices and ratings arrive as strings
//! with thousands separators ("2,999") as often as numbers.

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::models::Product;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog must be a JSON array or an object with a `root` array")]
    NotAnArray,
    #[error("catalog contains no products")]
    Empty,
}

#[derive(Deserialize)]
struct RawProduct {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    pid: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sub_category: Option<String>,
    #[serde(default)]
    selling_price: Value,
    #[serde(default)]
    actual_price: Value,
    #[serde(default)]
    average_rating: Value,
    #[serde(default)]
    discount: Option<String>,
    #[serde(default)]
    seller: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    out_of_stock: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    product_details: Value,
}

/// Load every product from the dataset at `path`.
pub fn load_catalog(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let products = parse_catalog(&data)?;
    tracing::info!("Loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

/// Parse dataset text. Records that are not usable product objects are skipped.
pub fn parse_catalog(data: &str) -> Result<Vec<Product>, CatalogError> {
    let raw: Value = serde_json::from_str(data)?;
    let items = match raw {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("root") {
            Some(Value::Array(items)) => items,
            _ => return Err(CatalogError::NotAnArray),
        },
        _ => return Err(CatalogError::NotAnArray),
    };

    let mut products = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawProduct>(item) {
            Ok(raw) => products.push(into_product(raw, index)),
            Err(e) => tracing::warn!("Skipping catalog record {index}: {e}"),
        }
    }

    if products.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(products)
}

fn into_product(raw: RawProduct, index: usize) -> Product {
    let id = raw
        .id
        .or(raw.pid)
        .unwrap_or_else(|| format!("record-{index}"));

    Product {
        id,
        title: raw.title,
        brand: raw.brand,
        category: raw.category,
        sub_category: raw.sub_category,
        selling_price: parse_number(&raw.selling_price),
        actual_price: parse_number(&raw.actual_price),
        average_rating: parse_number(&raw.average_rating),
        discount: raw.discount,
        seller: raw.seller,
        url: raw.url,
        out_of_stock: parse_flag(&raw.out_of_stock),
        description: raw.description,
        details: flatten_details(&raw.product_details),
    }
}

fn parse_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.replace(',', "").trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

/// Flatten product details (list of single-key objects, object or string) to text.
fn flatten_details(value: &Value) -> Option<String> {
    let mut parts = Vec::new();
    collect_text(value, &mut parts);
    let text = parts.join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn collect_text(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            if !s.trim().is_empty() {
                parts.push(s.trim().to_string());
            }
        }
        Value::Bool(_) | Value::Number(_) => parts.push(value.to_string()),
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, parts)),
        Value::Object(obj) => {
            for (key, v) in obj {
                parts.push(key.clone());
                collect_text(v, parts);
            }
        }
    }
}
