//! Product and category records served by the catalog backend

use serde::{Deserialize, Deserializer, Serialize};

/// Category reference embedded in a product record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Product record as served by the backend.
///
/// Only the fields the assistant reasons about are typed; everything else
/// (slug, images, stock, ...) is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    /// Price in the smallest currency unit (VND)
    #[serde(deserialize_with = "deserialize_price")]
    pub price: u64,
    #[serde(default)]
    pub category: CategoryRef,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>, price: u64, category: CategoryRef) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            category,
            extra: serde_json::Map::new(),
        }
    }
}

/// Category record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Category {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Product annotated with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub relevance_score: u32,
}

/// Decimal columns arrive either as JSON numbers or as strings ("1500000.00").
fn deserialize_price<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let value = match RawPrice::deserialize(deserializer)? {
        RawPrice::Int(v) => return Ok(v),
        RawPrice::Float(v) => v,
        RawPrice::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {s}")))?,
    };

    if !value.is_finite() || value < 0.0 {
        return Err(serde::de::Error::custom(format!("invalid price: {value}")));
    }
    Ok(value.round() as u64)
}
