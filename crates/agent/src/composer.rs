//! Response composition
//!
//! Turns an understood request into the text the user hears. The base
//! response is the chatbot's reply when it has one, otherwise a local
//! template; ranked products are appended as a short numbered block.

use figuro_voice_config::constants::{pricing, relevance};
use figuro_voice_config::{ConfigError, NluConfig, TemplateTable};
use figuro_voice_core::entity::first_value;
use figuro_voice_core::{Entity, EntityType, Intent, Language, RecommendedProduct};

/// Used only if every configured text came out blank
const LAST_RESORT: &str = "Xin lỗi, tôi chưa thể trả lời lúc này. Bạn vui lòng thử lại nhé!";

/// Builds user-facing response text
#[derive(Debug, Clone, Default)]
pub struct ResponseComposer {
    templates: TemplateTable,
}

impl ResponseComposer {
    pub fn new(templates: TemplateTable) -> Self {
        Self { templates }
    }

    /// Load templates from `nlu.templates_path`, or use the built-in table
    pub fn from_config(config: &NluConfig) -> Result<Self, ConfigError> {
        let templates = TemplateTable::load_or_default(config.templates_path.as_deref())?;
        Ok(Self::new(templates))
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Compose the final response. Never returns an empty string.
    pub fn compose(
        &self,
        intent: Intent,
        entities: &[Entity],
        transcript: &str,
        language: Language,
        remote_reply: Option<&str>,
        recommendations: &[RecommendedProduct],
    ) -> String {
        let remote = remote_reply.map(str::trim).filter(|r| !r.is_empty());
        let mut response = match remote {
            Some(reply) => reply.to_string(),
            None => self.base_response(intent, entities, transcript),
        };

        if response.trim().is_empty() {
            response = LAST_RESORT.to_string();
        }

        if !recommendations.is_empty() {
            response.push_str(&recommendation_block(recommendations, language));
        }
        response
    }

    /// Local response when the chatbot had nothing to say
    fn base_response(&self, intent: Intent, entities: &[Entity], transcript: &str) -> String {
        if intent.is_unknown() {
            return self.keyword_response(transcript);
        }

        let Some(template) = self.templates.get(intent) else {
            return self.fallback(transcript);
        };

        match (first_value(entities, EntityType::Product), &template.with_product) {
            (Some(product), Some(with_product)) => {
                let quantity = first_value(entities, EntityType::Quantity).unwrap_or("1");
                with_product
                    .replace("{product}", product)
                    .replace("{quantity}", quantity)
            }
            _ => template.text.clone(),
        }
    }

    /// First keyword topic hitting the transcript, else the fallback
    fn keyword_response(&self, transcript: &str) -> String {
        let lowered = transcript.to_lowercase();
        self.templates
            .keyword_responses
            .iter()
            .find(|topic| {
                topic
                    .keywords
                    .iter()
                    .any(|k| !k.is_empty() && lowered.contains(&k.to_lowercase()))
            })
            .map(|topic| {
                tracing::debug!(topic = %topic.topic, "Keyword response selected");
                topic.response.clone()
            })
            .unwrap_or_else(|| self.fallback(transcript))
    }

    fn fallback(&self, transcript: &str) -> String {
        self.templates
            .fallback
            .replace("{transcript}", transcript.trim())
    }
}

/// Follow-up actions offered for an intent when the chatbot gave none
pub fn suggested_actions(intent: Intent) -> Vec<String> {
    let actions: &[&str] = match intent {
        Intent::GetProductInfo | Intent::SearchProducts => {
            &["Xem chi tiết sản phẩm", "Thêm vào giỏ hàng", "Tìm sản phẩm tương tự"]
        }
        Intent::CreateOrder => &["Xem giỏ hàng", "Tiến hành thanh toán", "Tiếp tục mua sắm"],
        Intent::CheckOrderStatus | Intent::CancelOrder => {
            &["Xem đơn hàng", "Liên hệ hỗ trợ"]
        }
        Intent::PriceInquiry | Intent::CheckStock | Intent::CustomizationInquiry => {
            &["Xem chi tiết sản phẩm", "So sánh giá"]
        }
        _ => &["Tìm sản phẩm", "Kiểm tra đơn hàng", "Xem danh mục"],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

struct Labels {
    header: &'static str,
    price: &'static str,
    other_category: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::Vietnamese => Labels {
            header: "Sản phẩm gợi ý cho bạn:",
            price: "Giá",
            other_category: "Khác",
        },
        Language::English => Labels {
            header: "Recommended products:",
            price: "Price",
            other_category: "Other",
        },
        Language::Japanese => Labels {
            header: "おすすめ商品:",
            price: "価格",
            other_category: "その他",
        },
    }
}

fn recommendation_block(recommendations: &[RecommendedProduct], language: Language) -> String {
    let labels = labels(language);
    let mut block = format!("\n\n{}", labels.header);
    for (idx, rec) in recommendations
        .iter()
        .take(relevance::MAX_RENDERED)
        .enumerate()
    {
        let product = &rec.product;
        let category = match product.category.name.trim() {
            "" => labels.other_category,
            name => name,
        };
        block.push_str(&format!(
            "\n{}. {} - {} - {} {}",
            idx + 1,
            product.name,
            category,
            labels.price,
            format_price(product.price, language)
        ));
    }
    block
}

/// Render a VND amount for speech.
///
/// From one million up the amount is rounded to whole millions; below that
/// it is written out with comma thousands separators.
pub fn format_price(price: u64, language: Language) -> String {
    if price >= pricing::MILLION {
        let millions = price.saturating_add(pricing::MILLION / 2) / pricing::MILLION;
        return match language {
            Language::Vietnamese => format!("{} triệu đ", millions),
            Language::English => format!("{} million VND", millions),
            Language::Japanese => format!("{}百万ドン", millions),
        };
    }

    let amount = group_thousands(price);
    match language {
        Language::Vietnamese => format!("{}đ", amount),
        Language::English => format!("{} VND", amount),
        Language::Japanese => format!("{}ドン", amount),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
