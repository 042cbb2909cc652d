use serde_json::{json, Value};
use spectracore::dataset::RangeLabel;

/// Starter localization resource for one of the supported languages.
pub fn localization_template(language: &str) -> Value {
    match language {
        "en" => json!({
            "spectrumLabels": { "top": "Freely-leaning", "bottom": "DYE-leaning" },
            "rangeLabels": {
                "freely": "Freely",
                "leanFreely": "Leans Freely",
                "mixed": "Mixed",
                "leanDye": "Leans DYE",
                "dye": "DYE"
            },
            "popup": {
                "machineType": "Machine type",
                "notTested": "Not tested",
                "evidences": "Evidence excerpts",
                "watchVideo": "Watch video"
            },
            "dataLoadError": "Loading data.json failed."
        }),
        "ja" => json!({
            "spectrumLabels": { "top": "Freely寄り", "bottom": "DYE寄り" },
            "rangeLabels": {
                "freely": "Freely",
                "leanFreely": "Freely寄り",
                "mixed": "混合",
                "leanDye": "DYE寄り",
                "dye": "DYE"
            },
            "popup": {
                "machineType": "筐体タイプ",
                "notTested": "未検証",
                "evidences": "判定資料の抜粋",
                "watchVideo": "動画を見る"
            },
            "dataLoadError": "data.json の読み込みに失敗しました。"
        }),
        _ => json!({
            "spectrumLabels": { "top": "Freely傾向", "bottom": "DYE傾向" },
            "rangeLabels": {
                "freely": "Freely",
                "leanFreely": "偏Freely",
                "mixed": "混合",
                "leanDye": "偏DYE",
                "dye": "DYE"
            },
            "popup": {
                "machineType": "機台類型",
                "notTested": "未知",
                "evidences": "判定資料節錄",
                "watchVideo": "觀看影片"
            }
        }),
    }
}

/// Five labeled bands covering the whole 0-100 scale, top to bottom.
pub fn default_range_labels() -> Vec<RangeLabel> {
    [
        (90.0, 100.0, "Freely", "freely"),
        (54.44, 90.0, "偏Freely", "leanFreely"),
        (44.44, 54.44, "混合", "mixed"),
        (10.0, 44.44, "偏DYE", "leanDye"),
        (0.0, 10.0, "DYE", "dye"),
    ]
    .into_iter()
    .map(|(from, to, label, key)| RangeLabel {
        from,
        to,
        label: label.to_string(),
        label_key: Some(key.to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectracore::i18n::{Catalog, CatalogKey, LANGUAGES};

    #[test]
    fn every_language_has_a_parsable_template() {
        for language in LANGUAGES {
            let catalog = Catalog::from_value(localization_template(language.code)).unwrap();
            for label in default_range_labels() {
                let key = label.label_key.unwrap();
                assert!(catalog.range_label(&key).is_some(), "{} {}", language.code, key);
            }
        }
    }

    #[test]
    fn english_template_overrides_builtins() {
        let catalog = Catalog::from_value(localization_template("en")).unwrap();
        assert_eq!(catalog.text(CatalogKey::NotTested), "Not tested");
    }
}
