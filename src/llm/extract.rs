//! Learned filter extraction: asks the chat model for a Filter Set JSON
//! object and validates it strictly before use.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::chat::{self, sanitize_for_prompt, ChatMessage};
use crate::config::LlmConfig;
use crate::interpret::colors::is_css_color;
use crate::interpret::{ExtractError, FilterExtractor, FilterSet, Gender, Vocabulary};

const SYSTEM_PROMPT: &str = "You extract product search filters from a shopper's request. \
Respond with ONLY a JSON object with exactly these keys: \
\"product_type\" (string or null), \"color\" (a CSS color name or null), \
\"brand\" (string or null), \"price_min\" (number or null), \"price_max\" (number or null), \
\"gender\" (\"Men\", \"Women\", \"Unisex\" or null), \
\"attributes\" (array of short descriptive words, possibly empty). \
Use null for anything the request does not mention. No other keys, no explanation.";

/// Extraction through the configured chat model.
#[derive(Clone)]
pub struct LlmExtractor {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmExtractor {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

impl FilterExtractor for LlmExtractor {
    async fn extract(&self, query: &str, vocabulary: &Vocabulary) -> Result<FilterSet, ExtractError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!("Request: \"{}\"", sanitize_for_prompt(query))),
        ];
        let schema = filter_schema();

        let reply =
            chat::complete(&self.client, &self.config, &messages, 0.0, Some(&schema)).await?;
        parse_filter_set(&reply, vocabulary)
    }
}

/// JSON schema with exactly the Filter Set keys, all required, nullable scalars.
pub fn filter_schema() -> Value {
    let nullable_string = serde_json::json!({ "type": ["string", "null"] });
    let nullable_number = serde_json::json!({ "type": ["number", "null"], "minimum": 0 });

    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "product_type", "color", "brand", "price_min", "price_max", "gender", "attributes"
        ],
        "properties": {
            "product_type": nullable_string,
            "color": nullable_string,
            "brand": nullable_string,
            "price_min": nullable_number,
            "price_max": nullable_number,
            "gender": { "type": ["string", "null"], "enum": ["Men", "Women", "Unisex", null] },
            "attributes": { "type": "array", "items": { "type": "string" } }
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractedFilters {
    #[serde(default)]
    product_type: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    price_min: Option<f64>,
    #[serde(default)]
    price_max: Option<f64>,
    #[serde(default)]
    gender: Option<Gender>,
    #[serde(default)]
    attributes: Option<Vec<String>>,
}

/// Parse a model reply into a validated Filter Set.
///
/// The reply may wrap the object in prose or a code fence; the slice from
/// the first `{` to the last `}` is decoded. Unknown keys, wrong types,
/// non-CSS colors, out-of-vocabulary types or brands and negative prices are
/// all rejected.
pub fn parse_filter_set(content: &str, vocabulary: &Vocabulary) -> Result<FilterSet, ExtractError> {
    let json_str = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(ExtractError::MalformedJson(truncate(content, 200))),
    };

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| ExtractError::MalformedJson(e.to_string()))?;
    let raw: ExtractedFilters =
        serde_json::from_value(value).map_err(|e| ExtractError::Schema(e.to_string()))?;

    let product_type = normalize_optional(raw.product_type);
    if let Some(t) = &product_type {
        if !vocabulary.has_type(t) {
            return Err(ExtractError::Schema(format!("unknown product_type: {t}")));
        }
    }

    let brand = normalize_optional(raw.brand);
    if let Some(b) = &brand {
        if !vocabulary.has_brand(b) {
            return Err(ExtractError::Schema(format!("unknown brand: {b}")));
        }
    }

    let color = normalize_optional(raw.color);
    if let Some(c) = &color {
        if !is_css_color(c) {
            return Err(ExtractError::Schema(format!("not a CSS color name: {c}")));
        }
    }

    for (name, price) in [("price_min", raw.price_min), ("price_max", raw.price_max)] {
        if let Some(p) = price {
            if !p.is_finite() || p < 0.0 {
                return Err(ExtractError::Schema(format!("{name} must be >= 0, got {p}")));
            }
        }
    }

    let mut seen = HashSet::new();
    let attributes = raw
        .attributes
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty() && seen.insert(a.clone()))
        .collect();

    Ok(FilterSet {
        product_type,
        color,
        brand,
        price_min: raw.price_min,
        price_max: raw.price_max,
        gender: raw.gender,
        attributes,
    })
}

/// Trim + lower-case; empty strings count as absent.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
