//! Pattern Library
//!
//! Ordered regex tables for intent classification and entity extraction.
//! Table order is significant: the classifier walks intents top to bottom
//! and the first pattern that matches wins. Patterns are written against
//! lowercased text.
//!
//! The built-in tables cover Vietnamese, English and Japanese phrasings for
//! the figure store. A YAML file with the same shape replaces them wholesale.

use serde::{Deserialize, Serialize};
use std::path::Path;

use figuro_voice_core::{EntityType, Intent};

use crate::ConfigError;

/// Patterns for one intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPatterns {
    pub intent: Intent,
    pub patterns: Vec<String>,
}

/// Patterns for one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPatterns {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub patterns: Vec<String>,
}

/// Complete pattern configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternLibrary {
    #[serde(default)]
    pub intents: Vec<IntentPatterns>,
    #[serde(default)]
    pub entities: Vec<EntityPatterns>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self {
            intents: default_intent_patterns(),
            entities: default_entity_patterns(),
        }
    }
}

impl PatternLibrary {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;
        let library = Self::from_yaml(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            intents = library.intents.len(),
            entity_types = library.entities.len(),
            "Loaded pattern library"
        );
        Ok(library)
    }

    /// Parse and validate from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let library: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        library.validate()?;
        Ok(library)
    }

    /// Load from `path` when given, otherwise use the built-in tables
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Structural checks. Regex syntax is checked when the classifier
    /// compiles the tables.
    ///
    /// Intents must follow the fixed priority order (a subset is fine), may
    /// not repeat, and `unknown` can never carry patterns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut last_rank: Option<usize> = None;
        for entry in &self.intents {
            let rank = Intent::PRIORITY
                .iter()
                .position(|i| *i == entry.intent)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "patterns.intents".to_string(),
                    message: format!("'{}' cannot have patterns", entry.intent),
                })?;
            if let Some(prev) = last_rank {
                if rank <= prev {
                    return Err(ConfigError::InvalidValue {
                        field: "patterns.intents".to_string(),
                        message: format!(
                            "'{}' is duplicated or out of priority order",
                            entry.intent
                        ),
                    });
                }
            }
            last_rank = Some(rank);
        }

        let blank = self
            .intents
            .iter()
            .flat_map(|e| e.patterns.iter())
            .chain(self.entities.iter().flat_map(|e| e.patterns.iter()))
            .any(|p| p.trim().is_empty());
        if blank {
            return Err(ConfigError::InvalidValue {
                field: "patterns".to_string(),
                message: "empty pattern".to_string(),
            });
        }
        Ok(())
    }

    pub fn intent_patterns(&self, intent: Intent) -> &[String] {
        self.intents
            .iter()
            .find(|e| e.intent == intent)
            .map(|e| e.patterns.as_slice())
            .unwrap_or(&[])
    }
}

fn intent(intent: Intent, patterns: &[&str]) -> IntentPatterns {
    IntentPatterns {
        intent,
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn entity(entity_type: EntityType, patterns: &[&str]) -> EntityPatterns {
    EntityPatterns {
        entity_type,
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

/// Built-in intent table, in priority order.
///
/// Order-sensitive cases:
/// - create_order only fires on explicit buying verbs, so "tôi muốn tìm
///   mô hình ..." falls through to get_product_info.
/// - price_inquiry needs a question form ("giá của", "bao nhiêu"), so a bare
///   "giá sản phẩm" stays unknown.
/// - "hi"/"hey" are word-bounded; otherwise "chi tiết" would greet.
pub fn default_intent_patterns() -> Vec<IntentPatterns> {
    vec![
        intent(
            Intent::CreateOrder,
            &[
                r"(?:muốn|cần|đặt|mua|order|lấy)\s*(?:một|mô hình|figure|sản phẩm)",
                r"\b(?:tôi|em|mình)\s+(?:muốn|cần)\s+(?:đặt|mua|order|lấy)",
                r"\b(?:tôi|em|mình)\s+(?:đặt|mua|lấy)\b",
                r"(?:có thể|được không)\s+(?:đặt|mua|order|lấy)",
                r"(?:thêm|add)\s+(?:vào|to|into)\s+(?:giỏ|cart)",
                r"(?:mua|đặt|order)\s+(?:ngay|luôn|now)",
                r"\b(?:i want to|i'd like to|i would like to)\s+(?:buy|order|purchase)\b",
                r"\bplace an order\b",
                r"(?:買いたい|注文したい|購入したい)",
            ],
        ),
        intent(
            Intent::CancelOrder,
            &[
                r"(?:hủy|huỷ|cancel)\s+(?:đơn|order)",
                r"\b(?:không|ko)\s+(?:muốn|cần)\s+(?:nữa|rồi)",
                r"(?:bỏ|hủy|huỷ)\s+(?:đặt hàng|order)",
                r"\bcancel\s+my\s+order\b",
                r"キャンセル",
            ],
        ),
        intent(
            Intent::CheckOrderStatus,
            &[
                r"(?:kiểm tra|check|xem)\s+(?:đơn|order|trạng thái)",
                r"(?:đơn hàng|đơn|order)\s+(?:của\s+)?(?:tôi|em|mình)\s+(?:thế nào|ra sao|đến đâu|đâu rồi)",
                r"(?:tình trạng|trạng thái|status)\s+(?:đơn hàng|order)",
                r"(?:đơn hàng|order)\s+(?:đang|hiện tại)",
                r"\b(?:order status|where is my order|track my order)\b",
                r"(?:注文状況|配送状況)",
            ],
        ),
        intent(
            Intent::GetProductInfo,
            &[
                r"\b(?:tôi|em|mình)\s+(?:muốn|cần)\s+(?:tìm|find|search)\s*(?:sản phẩm|mô hình|figure)",
                r"(?:tìm|find|search)\s+(?:sản phẩm|mô hình|figure|product)",
                r"(?:cho|hiển thị)\s+(?:tôi|em|mình)\s+(?:xem\s+)?(?:sản phẩm|mô hình|figure)",
                r"\bshow me\b",
                r"(?:có|available)\s+(?:sản phẩm|mô hình|figure)\s+(?:gì|nào|what)",
                r"(?:gợi ý|suggest|recommend)\s+(?:sản phẩm|mô hình|figure|cho)",
                r"(?:thông tin|info|chi tiết)\s+(?:về|của|about)\s+",
                r"(?:mô tả|description)\s+(?:sản phẩm|figure)",
                r"\b(?:tell me about|looking for)\b",
                r"\b(?:naruto|goku|luffy|sasuke|vegeta|ichigo|eren|tanjiro|nezuko|zoro)\b",
                r"(?:anime|manga)\s+(?:figure|mô hình)",
                r"フィギュア",
            ],
        ),
        intent(
            Intent::SearchProducts,
            &[
                r"(?:danh mục|thể loại|category|categories)",
                r"(?:xem|duyệt|browse)\s+(?:tất cả\s+)?(?:sản phẩm|mô hình|figure|products)",
                r"(?:có những|liệt kê|list)\s+(?:sản phẩm|mô hình|figure|products)",
                r"\b(?:one piece|dragon ball|attack on titan|demon slayer|my hero academia|jujutsu kaisen)\b",
                r"(?:一覧|カテゴリ)",
            ],
        ),
        intent(
            Intent::CheckStock,
            &[
                r"(?:còn hàng|hết hàng|tồn kho|có sẵn)",
                r"\b(?:in stock|out of stock|still available)\b",
                r"在庫",
            ],
        ),
        intent(
            Intent::CustomizationInquiry,
            &[
                r"(?:tùy chỉnh|tuỳ chỉnh|cá nhân hóa|cá nhân hoá|khắc tên|in tên)",
                r"\b(?:custom|customize|customise|customization|customisation|personalize|personalise)\b",
                r"カスタム",
            ],
        ),
        intent(
            Intent::PriceInquiry,
            &[
                r"(?:giá|price|cost)\s+(?:của|bao nhiêu|là bao nhiêu|how much|of)",
                r"bao nhiêu\s+(?:tiền|đồng)",
                r"\bhow much\b",
                r"giá\s+(?:rẻ|cao|tốt)",
                r"(?:いくら|値段|価格)",
            ],
        ),
        intent(
            Intent::Greeting,
            &[
                r"\b(?:xin chào|hello|hi|chào|hey)\b",
                r"(?:chào|hello)\s+(?:bạn|anh|chị|admin|support)",
                r"(?:good morning|good afternoon|good evening)",
                r"(?:buổi sáng|buổi chiều|buổi tối)\s+(?:tốt lành|vui vẻ)",
                r"(?:こんにちは|おはよう|こんばんは)",
            ],
        ),
        intent(
            Intent::Goodbye,
            &[
                r"\b(?:tạm biệt|goodbye|bye|see you)\b",
                r"(?:hẹn gặp lại|until next time)",
                r"(?:cảm ơn|thank you|thanks)",
                r"\b(?:kết thúc|end|finish|done)\b",
                r"(?:さようなら|ありがとう)",
            ],
        ),
        intent(
            Intent::Help,
            &[
                r"\b(?:help|giúp|hỗ trợ|support|hướng dẫn)\b",
                r"(?:làm sao|làm thế nào)\s+(?:để|đặt|mua)",
                r"(?:助けて|ヘルプ)",
            ],
        ),
    ]
}

/// Built-in entity table, scanned type by type.
///
/// Capture group 1 (when present) becomes the entity value.
pub fn default_entity_patterns() -> Vec<EntityPatterns> {
    vec![
        entity(
            EntityType::Product,
            &[
                r"\b(naruto|uzumaki|sasuke|kakashi|itachi)\b",
                r"\b(goku|vegeta|gohan|piccolo|frieza|cell|majin buu)\b",
                r"\b(luffy|zoro|sanji|nami|chopper|robin|brook|franky|jinbe)\b",
                r"\b(ichigo|rukia|byakuya|kenpachi|aizen)\b",
                r"\b(eren|mikasa|levi|armin|annie)\b",
                r"\b(tanjiro|nezuko|zenitsu|inosuke|giyu)\b",
                r"\b(deku|bakugo|todoroki|all might|endeavor)\b",
                r"\b(totoro|spirited away|princess mononoke)\b",
                r"(?:mô hình|figure|model)\s+([a-z0-9]+(?:\s+[a-z0-9]+)*)\b",
                r"(?:nhân vật|character)\s+([a-z0-9]+(?:\s+[a-z0-9]+)*)\b",
            ],
        ),
        entity(
            EntityType::Category,
            &[
                r"(?:danh mục|thể loại|category|series)\s+([a-z0-9]+(?:\s+[a-z0-9]+)*)\b",
                r"\b(one piece|dragon ball|naruto|bleach|attack on titan|demon slayer|my hero academia|jujutsu kaisen|studio ghibli)\b",
            ],
        ),
        entity(
            EntityType::Quantity,
            &[
                r"(\d+)\s*(?:cái|chiếc|mô hình|figure|sản phẩm|con|bộ)",
                r"\b(một|hai|ba|bốn|năm|sáu|bảy|tám|chín|mười)\s+(?:cái|chiếc|mô hình|con|bộ)",
                r"\b(\d+)\b",
            ],
        ),
        entity(
            EntityType::Color,
            &[
                r"(?:màu\s+)?\b(đỏ|xanh|vàng|đen|trắng|hồng|tím|cam|red|blue|yellow|black|white|pink|purple|orange)\b",
            ],
        ),
        entity(
            EntityType::PriceRange,
            &[
                r"\b(giá rẻ|rẻ|bình dân|cheap|affordable|budget)\b",
                r"\b(đắt|cao cấp|expensive|premium|luxury)\b",
                r"(?:dưới|under|below|không quá)\s+\d+(?:[.,]\d+)*\s*(?:triệu|tr|nghìn|ngàn|k|million)?",
                r"(?:trên|over|above|hơn)\s+\d+(?:[.,]\d+)*\s*(?:triệu|tr|nghìn|ngàn|k|million)?",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_is_valid() {
        let library = PatternLibrary::default();
        assert!(library.validate().is_ok());
        assert_eq!(library.intents.len(), Intent::PRIORITY.len());
        let order: Vec<Intent> = library.intents.iter().map(|e| e.intent).collect();
        assert_eq!(order, Intent::PRIORITY.to_vec());
    }

    #[test]
    fn test_yaml_override() {
        let yaml = r#"
intents:
  - intent: greeting
    patterns: ["\\bxin chào\\b"]
  - intent: help
    patterns: ["giúp"]
entities:
  - type: color
    patterns: ["(đỏ|xanh)"]
"#;
        let library = PatternLibrary::from_yaml(yaml).unwrap();
        assert_eq!(library.intents.len(), 2);
        assert_eq!(library.intent_patterns(Intent::Help), ["giúp".to_string()]);
        assert!(library.intent_patterns(Intent::CreateOrder).is_empty());
        assert_eq!(library.entities[0].entity_type, EntityType::Color);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let yaml = r#"
intents:
  - intent: help
    patterns: ["giúp"]
  - intent: greeting
    patterns: ["chào"]
"#;
        assert!(matches!(
            PatternLibrary::from_yaml(yaml),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_cannot_have_patterns() {
        let yaml = r#"
intents:
  - intent: unknown
    patterns: ["."]
"#;
        assert!(PatternLibrary::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.yaml");
        std::fs::write(
            &path,
            "intents:\n  - intent: goodbye\n    patterns: [\"bye\"]\n",
        )
        .unwrap();
        let library = PatternLibrary::load(&path).unwrap();
        assert_eq!(library.intents[0].intent, Intent::Goodbye);

        let missing = PatternLibrary::load(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));
    }
}
