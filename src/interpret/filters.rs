use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured search intent extracted from a free-text query.
///
/// Every field is always present when serialized: an unconstrained field is
/// `null` and no attributes is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub product_type: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    /// Lower price bound. Not checked against `price_max`.
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub gender: Option<Gender>,
    pub attributes: Vec<String>,
}

impl FilterSet {
    /// True when no field constrains the search.
    pub fn is_unconstrained(&self) -> bool {
        self.product_type.is_none()
            && self.color.is_none()
            && self.brand.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.gender.is_none()
            && self.attributes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" => Ok(Gender::Men),
            "women" => Ok(Gender::Women),
            "unisex" => Ok(Gender::Unisex),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

// Case-insensitive on input, canonical casing on output.
impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
