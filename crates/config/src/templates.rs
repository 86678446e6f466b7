//! Response templates
//!
//! Static replies used when the chatbot backend has nothing to say. Keyed by
//! [`Intent`]; adding an intent means adding a variant and a row here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use figuro_voice_core::Intent;

use crate::ConfigError;

/// Reply for one intent.
///
/// `with_product` is used instead of `text` when a product entity was
/// extracted; it may reference `{product}` and `{quantity}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_product: Option<String>,
}

impl ResponseTemplate {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            with_product: None,
        }
    }

    fn with_product(text: &str, with_product: &str) -> Self {
        Self {
            text: text.to_string(),
            with_product: Some(with_product.to_string()),
        }
    }
}

/// Canned reply picked by keyword when the intent is unknown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResponse {
    pub topic: String,
    pub keywords: Vec<String>,
    pub response: String,
}

/// All static response text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTable {
    #[serde(default = "default_intent_templates")]
    pub intents: HashMap<Intent, ResponseTemplate>,
    /// Checked in order; first topic with a keyword hit wins
    #[serde(default = "default_keyword_responses")]
    pub keyword_responses: Vec<KeywordResponse>,
    /// Last resort; `{transcript}` is replaced with the user's words
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self {
            intents: default_intent_templates(),
            keyword_responses: default_keyword_responses(),
            fallback: default_fallback(),
        }
    }
}

impl TemplateTable {
    /// Load from a YAML file; sections left out keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let table: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Every classifiable intent needs a template and no text may be blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        for intent in Intent::PRIORITY {
            match self.intents.get(&intent) {
                Some(t) if !t.text.trim().is_empty() => {}
                _ => {
                    return Err(ConfigError::MissingField(format!(
                        "templates.intents.{}",
                        intent
                    )))
                }
            }
        }
        if self.fallback.trim().is_empty() {
            return Err(ConfigError::MissingField("templates.fallback".to_string()));
        }
        Ok(())
    }

    pub fn get(&self, intent: Intent) -> Option<&ResponseTemplate> {
        self.intents.get(&intent)
    }
}

fn default_intent_templates() -> HashMap<Intent, ResponseTemplate> {
    HashMap::from([
        (
            Intent::CreateOrder,
            ResponseTemplate::with_product(
                "Bạn muốn đặt hàng sản phẩm gì? Hãy cho tôi biết tên sản phẩm bạn quan tâm.",
                "Tôi hiểu bạn muốn đặt {quantity} sản phẩm {product}. Để đặt hàng, bạn có thể vào trang sản phẩm và thêm vào giỏ hàng. Tôi có thể giúp bạn tìm kiếm sản phẩm này không?",
            ),
        ),
        (
            Intent::CancelOrder,
            ResponseTemplate::plain(
                "Để hủy đơn hàng, bạn vào trang 'Đơn hàng', chọn đơn cần hủy và bấm 'Hủy đơn'. Đơn hàng chỉ có thể hủy khi chưa được giao cho đơn vị vận chuyển.",
            ),
        ),
        (
            Intent::CheckOrderStatus,
            ResponseTemplate::plain(
                "Để kiểm tra trạng thái đơn hàng, bạn có thể vào trang 'Đơn hàng' trong menu. Ở đó bạn sẽ thấy tất cả đơn hàng và trạng thái hiện tại của chúng.",
            ),
        ),
        (
            Intent::GetProductInfo,
            ResponseTemplate::with_product(
                "Bạn muốn biết thông tin về sản phẩm nào? Chúng tôi có nhiều loại figure như Naruto, One Piece, Dragon Ball, và nhiều anime khác.",
                "Tôi hiểu bạn muốn biết thông tin về {product}. Hiện tại chúng tôi có nhiều mô hình figure chất lượng cao. Bạn có thể xem chi tiết sản phẩm trong trang Products hoặc tôi có thể giúp bạn tìm kiếm sản phẩm tương tự.",
            ),
        ),
        (
            Intent::SearchProducts,
            ResponseTemplate::plain(
                "Chúng tôi có các danh mục figure như Naruto, One Piece, Dragon Ball, Demon Slayer và nhiều series khác. Bạn muốn xem danh mục nào?",
            ),
        ),
        (
            Intent::CheckStock,
            ResponseTemplate::with_product(
                "Bạn muốn kiểm tra tình trạng còn hàng của sản phẩm nào? Hãy cho tôi biết tên nhân vật hoặc mô hình.",
                "Để biết {product} còn hàng hay không, bạn có thể xem số lượng tồn kho ngay trên trang sản phẩm. Tôi có thể gợi ý thêm các mẫu tương tự cho bạn.",
            ),
        ),
        (
            Intent::CustomizationInquiry,
            ResponseTemplate::plain(
                "Một số mô hình hỗ trợ tùy chỉnh như khắc tên, đổi màu đế hoặc thêm phụ kiện. Bạn có thể xem các tùy chọn trong trang chi tiết sản phẩm, giá sẽ được tính lại theo lựa chọn của bạn.",
            ),
        ),
        (
            Intent::PriceInquiry,
            ResponseTemplate::with_product(
                "Giá figure anime thường dao động từ 500,000đ đến 2,000,000đ tùy kích thước, thương hiệu và độ hiếm. Bạn muốn xem giá của sản phẩm nào?",
                "Giá của {product} phụ thuộc vào phiên bản và kích thước. Bạn có thể xem giá chính xác trên trang sản phẩm.",
            ),
        ),
        (
            Intent::Greeting,
            ResponseTemplate::plain(
                "Xin chào! Tôi là trợ lý ảo Figuro. Tôi có thể giúp bạn:\n- Tìm kiếm và tư vấn sản phẩm figure\n- Kiểm tra thông tin đơn hàng\n- Hướng dẫn đặt hàng\n- Trả lời câu hỏi về sản phẩm\n\nBạn cần tôi giúp gì?",
            ),
        ),
        (
            Intent::Goodbye,
            ResponseTemplate::plain(
                "Cảm ơn bạn đã sử dụng dịch vụ Figuro! Hy vọng bạn tìm được những sản phẩm figure ưng ý. Hẹn gặp lại!",
            ),
        ),
        (
            Intent::Help,
            ResponseTemplate::plain(
                "Tôi sẵn sàng hỗ trợ bạn! Tôi có thể giúp:\n- Tìm kiếm sản phẩm figure anime\n- Kiểm tra và theo dõi đơn hàng\n- Tư vấn giá cả và chất lượng\n- Hướng dẫn đặt hàng\n\nBạn cần hỗ trợ về vấn đề gì?",
            ),
        ),
    ])
}

fn keyword(topic: &str, keywords: &[&str], response: &str) -> KeywordResponse {
    KeywordResponse {
        topic: topic.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        response: response.to_string(),
    }
}

/// Price is checked before product so "giá sản phẩm" gets the price answer.
fn default_keyword_responses() -> Vec<KeywordResponse> {
    vec![
        keyword(
            "price",
            &["giá", "price", "tiền", "cost", "bao nhiêu"],
            "Bạn muốn hỏi về giá sản phẩm? Giá figure anime thường dao động từ 500,000đ đến 2,000,000đ tùy vào:\n- Kích thước và chất lượng\n- Thương hiệu sản xuất\n- Độ hiếm của nhân vật\n\nBạn muốn xem giá của sản phẩm nào cụ thể?",
        ),
        keyword(
            "product",
            &["sản phẩm", "mô hình", "figure", "anime", "manga"],
            "Tôi thấy bạn quan tâm đến sản phẩm figure! Chúng tôi có nhiều mô hình anime chất lượng cao. Bạn có thể:\n- Xem trang Products để duyệt tất cả sản phẩm\n- Nói tên nhân vật bạn muốn tìm (ví dụ: Naruto, Goku, Luffy)\n- Hỏi về giá cả hoặc thông tin chi tiết\n\nBạn muốn tìm mô hình nhân vật nào?",
        ),
        keyword(
            "order",
            &["đơn hàng", "order", "mua", "đặt"],
            "Tôi có thể giúp bạn về đơn hàng! Bạn có thể:\n- Kiểm tra trạng thái đơn hàng hiện tại\n- Đặt hàng sản phẩm mới\n- Hỏi về quy trình đặt hàng\n\nBạn cần hỗ trợ gì cụ thể về đơn hàng?",
        ),
        keyword(
            "help",
            &["help", "giúp", "hỗ trợ", "support"],
            "Tôi sẵn sàng hỗ trợ bạn! Tôi có thể giúp:\n- Tìm kiếm sản phẩm figure anime\n- Kiểm tra và theo dõi đơn hàng\n- Tư vấn giá cả và chất lượng\n- Hướng dẫn đặt hàng\n- Chuyển sang tư vấn viên\n\nBạn cần hỗ trợ về vấn đề gì?",
        ),
    ]
}

fn default_fallback() -> String {
    "Tôi chưa hiểu rõ ý bạn muốn nói '{transcript}'. Có thể bạn muốn:\n\n- Tìm sản phẩm: 'Tôi muốn tìm mô hình Naruto'\n- Kiểm tra đơn hàng: 'Đơn hàng của tôi thế nào?'\n- Tư vấn: 'Gợi ý sản phẩm cho tôi'\n\nHãy thử nói lại với từ khóa rõ ràng hơn nhé!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_intent() {
        let table = TemplateTable::default();
        assert!(table.validate().is_ok());
        assert!(table.get(Intent::Unknown).is_none());
        assert!(table.fallback.contains("{transcript}"));
    }

    #[test]
    fn test_price_topic_checked_first() {
        let table = TemplateTable::default();
        assert_eq!(table.keyword_responses[0].topic, "price");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
fallback: "Xin lỗi, tôi chưa hiểu: {transcript}"
"#;
        let table = TemplateTable::from_yaml(yaml).unwrap();
        assert!(table.fallback.starts_with("Xin lỗi"));
        assert_eq!(table.intents.len(), Intent::PRIORITY.len());
    }

    #[test]
    fn test_missing_intent_rejected() {
        let yaml = r#"
intents:
  greeting:
    text: "Chào!"
"#;
        assert!(matches!(
            TemplateTable::from_yaml(yaml),
            Err(ConfigError::MissingField(_))
        ));
    }
}
