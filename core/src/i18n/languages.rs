/// A selectable interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const DEFAULT_LANGUAGE: &str = "zh-TW";

pub const LANGUAGES: [Language; 3] = [
    Language {
        code: "zh-TW",
        name: "正體中文",
    },
    Language {
        code: "ja",
        name: "日本語",
    },
    Language {
        code: "en",
        name: "English",
    },
];

/// Prefix for weak-range tooltips.
pub fn rare_label(language: &str) -> &'static str {
    match language {
        "en" => "(Rare)",
        "ja" => "（レア）",
        _ => "（少見）",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_listed_first() {
        assert_eq!(LANGUAGES[0].code, DEFAULT_LANGUAGE);
    }

    #[test]
    fn unknown_languages_get_the_default_rare_label() {
        assert_eq!(rare_label("fr"), rare_label(DEFAULT_LANGUAGE));
        assert_eq!(rare_label("en"), "(Rare)");
    }
}
