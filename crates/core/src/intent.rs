//! Intent labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classified user goal for one input.
///
/// Variant order matches the classifier's priority order; `Unknown` is the
/// terminal fallback and never has patterns of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateOrder,
    CancelOrder,
    CheckOrderStatus,
    GetProductInfo,
    SearchProducts,
    CheckStock,
    CustomizationInquiry,
    PriceInquiry,
    Greeting,
    Goodbye,
    Help,
    #[default]
    Unknown,
}

impl Intent {
    /// Classifiable intents in priority order (excludes `Unknown`)
    pub const PRIORITY: [Intent; 11] = [
        Intent::CreateOrder,
        Intent::CancelOrder,
        Intent::CheckOrderStatus,
        Intent::GetProductInfo,
        Intent::SearchProducts,
        Intent::CheckStock,
        Intent::CustomizationInquiry,
        Intent::PriceInquiry,
        Intent::Greeting,
        Intent::Goodbye,
        Intent::Help,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CreateOrder => "create_order",
            Intent::CancelOrder => "cancel_order",
            Intent::CheckOrderStatus => "check_order_status",
            Intent::GetProductInfo => "get_product_info",
            Intent::SearchProducts => "search_products",
            Intent::CheckStock => "check_stock",
            Intent::CustomizationInquiry => "customization_inquiry",
            Intent::PriceInquiry => "price_inquiry",
            Intent::Greeting => "greeting",
            Intent::Goodbye => "goodbye",
            Intent::Help => "help",
            Intent::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Intent::Unknown)
    }

    /// Whether a product lookup is worth doing for this intent
    pub fn wants_recommendations(&self) -> bool {
        matches!(
            self,
            Intent::CreateOrder
                | Intent::GetProductInfo
                | Intent::SearchProducts
                | Intent::CheckStock
                | Intent::CustomizationInquiry
                | Intent::PriceInquiry
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::PRIORITY
            .iter()
            .chain(std::iter::once(&Intent::Unknown))
            .find(|intent| intent.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown intent label: {s}"))
    }
}
