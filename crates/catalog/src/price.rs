//! Price bands and filters
//!
//! Two inputs describe price preferences:
//! - `price_range` entity values from the extractor ("giá rẻ", "dưới 2 triệu")
//! - filter specs on the HTTP surface (`under_2000000`, `cheap`, `high`)
//!
//! Both resolve to a [`PriceBand`].

use figuro_voice_config::constants::pricing::{CHEAP_BELOW, EXPENSIVE_ABOVE, MILLION};
use figuro_voice_core::Product;

const CHEAP_WORDS: &[&str] = &[
    "giá rẻ",
    "rẻ",
    "bình dân",
    "cheap",
    "affordable",
    "budget",
    "low",
    "安い",
];
const EXPENSIVE_WORDS: &[&str] = &[
    "đắt",
    "cao cấp",
    "expensive",
    "premium",
    "luxury",
    "high",
    "高い",
];
const UNDER_PREFIXES: &[&str] = &["không quá", "dưới", "under", "below"];
const OVER_PREFIXES: &[&str] = &["trên", "over", "above", "hơn"];

/// A price constraint, in VND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBand {
    /// Strictly below 2,000,000
    Cheap,
    /// Strictly above 3,000,000
    Expensive,
    /// At most N
    Under(u64),
    /// At least N
    Over(u64),
}

impl PriceBand {
    pub fn matches(&self, price: u64) -> bool {
        match *self {
            PriceBand::Cheap => price < CHEAP_BELOW,
            PriceBand::Expensive => price > EXPENSIVE_ABOVE,
            PriceBand::Under(max) => price <= max,
            PriceBand::Over(min) => price >= min,
        }
    }

    /// Interpret an extracted `price_range` value
    pub fn from_entity_value(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();

        if let Some(rest) = strip_any_prefix(&value, UNDER_PREFIXES) {
            return parse_amount(rest).map(PriceBand::Under);
        }
        if let Some(rest) = strip_any_prefix(&value, OVER_PREFIXES) {
            return parse_amount(rest).map(PriceBand::Over);
        }
        if EXPENSIVE_WORDS.iter().any(|w| value.contains(w)) {
            return Some(PriceBand::Expensive);
        }
        if CHEAP_WORDS.iter().any(|w| value.contains(w)) {
            return Some(PriceBand::Cheap);
        }
        None
    }
}

/// Filter spec accepted by `filter_by_price`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceFilter {
    #[default]
    Any,
    Band(PriceBand),
}

impl PriceFilter {
    /// Parse `under_<N>`, `over_<N>`, `low`/`cheap`, `high`/`expensive`.
    /// Anything else, including a malformed N, means no filtering.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim().to_lowercase();
        let band = if let Some(n) = spec.strip_prefix("under_") {
            n.parse().ok().map(PriceBand::Under)
        } else if let Some(n) = spec.strip_prefix("over_") {
            n.parse().ok().map(PriceBand::Over)
        } else {
            match spec.as_str() {
                "low" | "cheap" => Some(PriceBand::Cheap),
                "high" | "expensive" => Some(PriceBand::Expensive),
                _ => None,
            }
        };
        band.map(PriceFilter::Band).unwrap_or_default()
    }

    pub fn matches(&self, price: u64) -> bool {
        match self {
            PriceFilter::Any => true,
            PriceFilter::Band(band) => band.matches(price),
        }
    }
}

/// Keep products whose price satisfies `spec`, preserving order
pub fn filter_by_price(products: &[Product], spec: &str) -> Vec<Product> {
    let filter = PriceFilter::parse(spec);
    products
        .iter()
        .filter(|p| filter.matches(p.price))
        .cloned()
        .collect()
}

fn strip_any_prefix<'a>(value: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|p| value.strip_prefix(p))
        .map(str::trim)
}

/// "2 triệu" -> 2_000_000, "500k" -> 500_000, "1.5 tr" -> 1_500_000,
/// "2.000.000" -> 2_000_000
fn parse_amount(text: &str) -> Option<u64> {
    let digits_end = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == ','))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(digits_end);
    if number.is_empty() {
        return None;
    }

    let multiplier = match unit.trim() {
        "" | "đ" | "đồng" | "vnd" => 1,
        "triệu" | "tr" | "million" => MILLION,
        "nghìn" | "ngàn" | "k" => 1_000,
        _ => return None,
    };

    // A trailing group of exactly three digits is a thousands separator
    let grouped = number
        .rfind(['.', ','])
        .map(|i| number.len() - i - 1 == 3)
        .unwrap_or(false);
    let value: f64 = if grouped {
        number.replace(['.', ','], "").parse().ok()?
    } else {
        number.replace(',', ".").parse().ok()?
    };

    let amount = (value * multiplier as f64).round();
    (amount.is_finite() && amount >= 0.0).then_some(amount as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figuro_voice_core::CategoryRef;

    fn product(id: u64, price: u64) -> Product {
        Product::new(id, format!("Figure {id}"), price, CategoryRef::default())
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(
            PriceFilter::parse("under_2000000"),
            PriceFilter::Band(PriceBand::Under(2_000_000))
        );
        assert_eq!(
            PriceFilter::parse("over_500"),
            PriceFilter::Band(PriceBand::Over(500))
        );
        assert_eq!(PriceFilter::parse("cheap"), PriceFilter::Band(PriceBand::Cheap));
        assert_eq!(PriceFilter::parse("LOW"), PriceFilter::Band(PriceBand::Cheap));
        assert_eq!(PriceFilter::parse("high"), PriceFilter::Band(PriceBand::Expensive));
        assert_eq!(PriceFilter::parse("under_abc"), PriceFilter::Any);
        assert_eq!(PriceFilter::parse("whatever"), PriceFilter::Any);
        assert_eq!(PriceFilter::parse(""), PriceFilter::Any);
    }

    #[test]
    fn test_filter_under_is_inclusive() {
        let products = vec![
            product(1, 1_500_000),
            product(2, 2_000_000),
            product(3, 2_500_000),
        ];
        let kept = filter_by_price(&products, "under_2000000");
        let ids: Vec<u64> = kept.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let kept = filter_by_price(&products, "over_2000000");
        let ids: Vec<u64> = kept.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_band_thresholds_are_strict() {
        assert!(PriceBand::Cheap.matches(1_999_999));
        assert!(!PriceBand::Cheap.matches(2_000_000));
        assert!(!PriceBand::Expensive.matches(3_000_000));
        assert!(PriceBand::Expensive.matches(3_000_001));
    }

    #[test]
    fn test_unknown_spec_keeps_everything() {
        let products = vec![product(1, 10), product(2, 10_000_000)];
        assert_eq!(filter_by_price(&products, "medium").len(), 2);
    }

    #[test]
    fn test_band_from_entity_value() {
        assert_eq!(PriceBand::from_entity_value("giá rẻ"), Some(PriceBand::Cheap));
        assert_eq!(PriceBand::from_entity_value("cheap"), Some(PriceBand::Cheap));
        assert_eq!(PriceBand::from_entity_value("cao cấp"), Some(PriceBand::Expensive));
        assert_eq!(
            PriceBand::from_entity_value("dưới 2 triệu"),
            Some(PriceBand::Under(2_000_000))
        );
        assert_eq!(
            PriceBand::from_entity_value("trên 500k"),
            Some(PriceBand::Over(500_000))
        );
        assert_eq!(
            PriceBand::from_entity_value("under 1.5 million"),
            Some(PriceBand::Under(1_500_000))
        );
        assert_eq!(
            PriceBand::from_entity_value("dưới 2.000.000"),
            Some(PriceBand::Under(2_000_000))
        );
        assert_eq!(PriceBand::from_entity_value("màu đỏ"), None);
        assert_eq!(PriceBand::from_entity_value("dưới nhiều"), None);
    }
}
