//! Extracted entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of structured fragment pulled out of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Product,
    Category,
    Quantity,
    Color,
    PriceRange,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Product => "product",
            EntityType::Category => "category",
            EntityType::Quantity => "quantity",
            EntityType::Color => "color",
            EntityType::PriceRange => "price_range",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(EntityType::Product),
            "category" => Ok(EntityType::Category),
            "quantity" => Ok(EntityType::Quantity),
            "color" => Ok(EntityType::Color),
            "price_range" => Ok(EntityType::PriceRange),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// A single match produced by the entity extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub value: String,
    pub confidence: f32,
}

impl Entity {
    pub fn new(entity_type: EntityType, value: impl Into<String>, confidence: f32) -> Self {
        Self {
            entity_type,
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn is(&self, entity_type: EntityType) -> bool {
        self.entity_type == entity_type
    }
}

/// First value of the given type, in extraction order
pub fn first_value(entities: &[Entity], entity_type: EntityType) -> Option<&str> {
    entities
        .iter()
        .find(|e| e.is(entity_type))
        .map(|e| e.value.as_str())
}
