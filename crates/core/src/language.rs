//! Supported interaction languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Languages the assistant understands and answers in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "vi-VN", alias = "vi")]
    Vietnamese,
    #[serde(rename = "en-US", alias = "en")]
    English,
    #[serde(rename = "ja-JP", alias = "ja")]
    Japanese,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 3] = [Language::Vietnamese, Language::English, Language::Japanese];

    /// BCP-47 tag (e.g. "vi-VN")
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Vietnamese => "vi-VN",
            Language::English => "en-US",
            Language::Japanese => "ja-JP",
        }
    }

    /// Short code expected by speech synthesis services
    pub fn tts_code(&self) -> &'static str {
        match self {
            Language::Vietnamese => "vi",
            Language::English => "en",
            Language::Japanese => "ja",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Vietnamese => "Vietnamese",
            Language::English => "English (US)",
            Language::Japanese => "Japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "vi-vn" | "vi" => Ok(Language::Vietnamese),
            "en-us" | "en" => Ok(Language::English),
            "ja-jp" | "ja" => Ok(Language::Japanese),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("vi-VN".parse::<Language>().unwrap(), Language::Vietnamese);
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("ja_JP".parse::<Language>().unwrap(), Language::Japanese);
        assert!(matches!(
            "fr-FR".parse::<Language>(),
            Err(Error::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_tts_codes() {
        assert_eq!(Language::Vietnamese.tts_code(), "vi");
        assert_eq!(Language::English.tts_code(), "en");
        assert_eq!(Language::Japanese.tts_code(), "ja");
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&Language::English).unwrap();
        assert_eq!(json, "\"en-US\"");
        let lang: Language = serde_json::from_str("\"vi\"").unwrap();
        assert_eq!(lang, Language::Vietnamese);
    }
}
