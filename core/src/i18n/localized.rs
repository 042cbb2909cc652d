use crate::i18n::languages::DEFAULT_LANGUAGE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A text field that is either one string or a per-language mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Plain text comes back verbatim. Mappings try the active language, then
    /// the fallback language, then give up with an empty string. Empty entries
    /// count as missing.
    pub fn resolve<'a>(&'a self, locale: &Locale) -> &'a str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Localized(entries) => [locale.active.as_str(), locale.fallback.as_str()]
                .into_iter()
                .filter_map(|code| entries.get(code))
                .map(String::as_str)
                .find(|text| !text.is_empty())
                .unwrap_or(""),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

/// Active and fallback language codes for one rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub active: String,
    pub fallback: String,
}

impl Locale {
    pub fn new(active: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            fallback: fallback.into(),
        }
    }

    /// Locale with the project default as fallback.
    pub fn with_default_fallback(active: impl Into<String>) -> Self {
        Self::new(active, DEFAULT_LANGUAGE)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, DEFAULT_LANGUAGE)
    }
}

/// Resolves an optional field; absent fields resolve to an empty string.
pub fn resolve(text: Option<&LocalizedText>, locale: &Locale) -> String {
    text.map(|text| text.resolve(locale).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rumor() -> LocalizedText {
        serde_json::from_str(r#"{ "en": "Rumor", "ja": "噂" }"#).unwrap()
    }

    #[test]
    fn missing_active_and_fallback_resolve_to_empty() {
        let locale = Locale::new("zh-TW", "zh-TW");
        assert_eq!(rumor().resolve(&locale), "");
    }

    #[test]
    fn active_language_wins() {
        let locale = Locale::new("ja", "en");
        assert_eq!(rumor().resolve(&locale), "噂");
    }

    #[test]
    fn fallback_language_is_used_second() {
        let locale = Locale::new("zh-TW", "en");
        assert_eq!(rumor().resolve(&locale), "Rumor");
    }

    #[test]
    fn plain_text_ignores_language() {
        let text: LocalizedText = serde_json::from_str(r#""Freely""#).unwrap();
        assert_eq!(text, LocalizedText::Plain("Freely".into()));
        assert_eq!(text.resolve(&Locale::new("ja", "en")), "Freely");
    }

    #[test]
    fn absent_field_is_empty() {
        assert_eq!(resolve(None, &Locale::default()), "");
    }

    #[test]
    fn empty_entries_fall_through() {
        let text: LocalizedText = serde_json::from_str(r#"{ "ja": "", "zh-TW": "謠言" }"#).unwrap();
        assert_eq!(text.resolve(&Locale::new("ja", "zh-TW")), "謠言");
    }
}
