use crate::prelude::{EngineError, EngineResult};
use serde_json::Value;

/// Strings the engine reads from a localization resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKey {
    SpectrumTop,
    SpectrumBottom,
    MachineType,
    NotTested,
    Evidences,
    WatchVideo,
    DataLoadError,
}

impl CatalogKey {
    pub fn path(self) -> &'static str {
        match self {
            CatalogKey::SpectrumTop => "spectrumLabels.top",
            CatalogKey::SpectrumBottom => "spectrumLabels.bottom",
            CatalogKey::MachineType => "popup.machineType",
            CatalogKey::NotTested => "popup.notTested",
            CatalogKey::Evidences => "popup.evidences",
            CatalogKey::WatchVideo => "popup.watchVideo",
            CatalogKey::DataLoadError => "dataLoadError",
        }
    }

    /// Built-in text used when the resource lacks the key.
    pub fn fallback(self) -> &'static str {
        match self {
            CatalogKey::SpectrumTop => "Freely傾向",
            CatalogKey::SpectrumBottom => "DYE傾向",
            CatalogKey::MachineType => "機台類型",
            CatalogKey::NotTested => "未知",
            CatalogKey::Evidences => "判定資料節錄",
            CatalogKey::WatchVideo => "觀看影片",
            CatalogKey::DataLoadError => {
                "Loading data.json failed, loading dummy data for preview styling."
            }
        }
    }
}

/// A loaded localization resource for one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    root: Value,
}

impl Catalog {
    /// A catalog with no entries; every lookup falls back.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> EngineResult<Self> {
        let root: Value = serde_json::from_str(input)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> EngineResult<Self> {
        if !root.is_object() {
            return Err(EngineError::InvalidInput(
                "localization root must be an object".into(),
            ));
        }
        Ok(Self { root })
    }

    /// Looks up a dotted path; empty strings count as missing.
    pub fn lookup(&self, path: &str) -> Option<&str> {
        path.split('.')
            .try_fold(&self.root, |node, segment| node.get(segment))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }

    pub fn text(&self, key: CatalogKey) -> &str {
        self.lookup(key.path()).unwrap_or_else(|| key.fallback())
    }

    /// Localized label for a range label key, if the resource has one.
    pub fn range_label(&self, label_key: &str) -> Option<&str> {
        self.root
            .get("rangeLabels")
            .and_then(|labels| labels.get(label_key))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}
