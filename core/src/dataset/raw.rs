use crate::i18n::LocalizedText;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Top-level shape of `data.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDataset {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub range: Vec<RangeLabel>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<RawDevice>,
}

/// Optional inputs may be absent or `null`; both mean "nothing".
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Evidence lists tolerate `null` for the whole list and for single entries.
/// A `null` entry becomes empty text, which the popup skips.
fn evidence_list<'de, D>(deserializer: D) -> Result<Vec<LocalizedText>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Option<LocalizedText>>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.unwrap_or_else(|| LocalizedText::Plain(String::new())))
        .collect())
}

/// Dataset-wide information shown outside the two views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub members: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Labeled sub-range drawn next to the gradient bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeLabel {
    pub from: f64,
    pub to: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_key: Option<String>,
}

impl RangeLabel {
    pub fn midpoint(&self) -> f64 {
        (self.from + self.to) / 2.0
    }
}

/// The two sub-identifiers a device id is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIds {
    pub keychip: String,
    pub main: String,
}

/// Classification interval on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn uncertainty(&self) -> f64 {
        self.max - self.min
    }
}

/// One device entry as it appears in the input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDevice {
    pub ids: DeviceIds,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub en_store: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub en_position: String,
    #[serde(default, rename = "type")]
    pub kind: Option<LocalizedText>,
    #[serde(default)]
    pub desc: Option<LocalizedText>,
    #[serde(default, deserialize_with = "evidence_list")]
    pub evidences: Vec<LocalizedText>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ranges: Vec<Interval>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weak_ranges: Vec<Interval>,
}
