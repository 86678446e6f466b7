//! Intent Classification
//!
//! Walks the pattern library in priority order and returns the first intent
//! whose pattern matches anywhere in the lowercased text. There is no
//! scoring across intents: declaration order is the tie-break.
//!
//! # Example
//!
//! ```
//! use figuro_voice_config::PatternLibrary;
//! use figuro_voice_core::Intent;
//! use figuro_voice_text_processing::IntentClassifier;
//!
//! let classifier = IntentClassifier::new(&PatternLibrary::default()).unwrap();
//! assert_eq!(classifier.classify("Xin chào"), Intent::Greeting);
//! assert_eq!(classifier.classify("asdf qwer"), Intent::Unknown);
//! ```

use regex::Regex;

use figuro_voice_config::PatternLibrary;
use figuro_voice_core::Intent;

use crate::{compile_pattern, normalize, Result};

/// Compiled patterns for one intent
struct CompiledIntent {
    intent: Intent,
    patterns: Vec<Regex>,
}

/// Which rule fired, for debugging and logs
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch {
    pub intent: Intent,
    pub pattern: String,
}

/// Ordered, first-match-wins intent classifier
pub struct IntentClassifier {
    table: Vec<CompiledIntent>,
}

impl IntentClassifier {
    /// Compile the intent tables of `library`
    pub fn new(library: &PatternLibrary) -> Result<Self> {
        let table = library
            .intents
            .iter()
            .map(|entry| {
                let patterns = entry
                    .patterns
                    .iter()
                    .map(|p| compile_pattern(entry.intent.as_str(), p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledIntent {
                    intent: entry.intent,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            intents = table.len(),
            patterns = table.iter().map(|t| t.patterns.len()).sum::<usize>(),
            "Compiled intent patterns"
        );
        Ok(Self { table })
    }

    /// Classifier over the built-in tables
    pub fn with_default_patterns() -> Result<Self> {
        Self::new(&PatternLibrary::default())
    }

    /// Classify text; `Intent::Unknown` when nothing matches
    pub fn classify(&self, text: &str) -> Intent {
        self.classify_with_match(text)
            .map(|m| m.intent)
            .unwrap_or(Intent::Unknown)
    }

    /// Classify and report the pattern that fired
    pub fn classify_with_match(&self, text: &str) -> Option<IntentMatch> {
        let normalized = normalize(text);
        for entry in &self.table {
            if let Some(regex) = entry.patterns.iter().find(|r| r.is_match(&normalized)) {
                return Some(IntentMatch {
                    intent: entry.intent,
                    pattern: regex.as_str().to_string(),
                });
            }
        }
        None
    }

    /// Intents in the order they are tried
    pub fn intents(&self) -> impl Iterator<Item = Intent> + '_ {
        self.table.iter().map(|t| t.intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figuro_voice_config::IntentPatterns;

    fn classifier() -> IntentClassifier {
        IntentClassifier::with_default_patterns().unwrap()
    }

    #[test]
    fn test_product_search_beats_order() {
        assert_eq!(
            classifier().classify("Tôi muốn tìm mô hình Naruto"),
            Intent::GetProductInfo
        );
    }

    #[test]
    fn test_greeting() {
        let c = classifier();
        assert_eq!(c.classify("Xin chào"), Intent::Greeting);
        assert_eq!(c.classify("Hello there"), Intent::Greeting);
        assert_eq!(c.classify("Xin chào, bạn có thể giúp tôi không?"), Intent::Greeting);
        assert_eq!(c.classify("こんにちは"), Intent::Greeting);
    }

    #[test]
    fn test_hi_needs_word_boundary() {
        // "chi tiết" contains "hi" but is not a greeting
        assert_ne!(classifier().classify("chi tiết"), Intent::Greeting);
    }

    #[test]
    fn test_order_intents() {
        let c = classifier();
        assert_eq!(c.classify("Tôi muốn mua 2 cái Luffy"), Intent::CreateOrder);
        assert_eq!(c.classify("Thêm vào giỏ hàng giúp tôi"), Intent::CreateOrder);
        assert_eq!(c.classify("Tôi muốn hủy đơn hàng"), Intent::CancelOrder);
        assert_eq!(c.classify("Đơn hàng của tôi thế nào?"), Intent::CheckOrderStatus);
        assert_eq!(c.classify("Kiểm tra đơn hàng số 12"), Intent::CheckOrderStatus);
    }

    #[test]
    fn test_catalog_intents() {
        let c = classifier();
        assert_eq!(c.classify("Show me Dragon Ball figures"), Intent::GetProductInfo);
        assert_eq!(
            c.classify("Tôi muốn xem sản phẩm trong danh mục One Piece"),
            Intent::SearchProducts
        );
        assert_eq!(c.classify("Sản phẩm này còn hàng không?"), Intent::CheckStock);
        assert_eq!(c.classify("Có thể khắc tên lên đế không?"), Intent::CustomizationInquiry);
        assert_eq!(c.classify("Giá của sản phẩm này bao nhiêu?"), Intent::PriceInquiry);
    }

    #[test]
    fn test_goodbye_and_help() {
        let c = classifier();
        assert_eq!(c.classify("Cảm ơn nhé"), Intent::Goodbye);
        assert_eq!(c.classify("Tạm biệt"), Intent::Goodbye);
        assert_eq!(c.classify("Hướng dẫn thanh toán"), Intent::Help);
    }

    #[test]
    fn test_bare_price_keyword_is_unknown() {
        assert_eq!(classifier().classify("giá sản phẩm"), Intent::Unknown);
    }

    #[test]
    fn test_no_match_is_unknown() {
        let c = classifier();
        for text in ["", "   ", "xyz 123", "!!!", "thời tiết hôm nay"] {
            assert_eq!(c.classify(text), Intent::Unknown, "text: {text:?}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classifier().classify("XIN CHÀO"), Intent::Greeting);
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let library = PatternLibrary {
            intents: vec![
                IntentPatterns {
                    intent: Intent::CreateOrder,
                    patterns: vec!["figure".into()],
                },
                IntentPatterns {
                    intent: Intent::GetProductInfo,
                    patterns: vec!["figure".into()],
                },
            ],
            entities: vec![],
        };
        let c = IntentClassifier::new(&library).unwrap();
        let m = c.classify_with_match("a figure please").unwrap();
        assert_eq!(m.intent, Intent::CreateOrder);
        assert_eq!(m.pattern, "figure");
    }

    #[test]
    fn test_malformed_pattern_is_error() {
        let library = PatternLibrary {
            intents: vec![IntentPatterns {
                intent: Intent::Help,
                patterns: vec!["(unclosed".into()],
            }],
            entities: vec![],
        };
        assert!(IntentClassifier::new(&library).is_err());
    }
}
