use crate::dataset::raw::{Interval, Metadata, RangeLabel, RawDataset, RawDevice};
use crate::dataset::sanitize::sanitize;
use crate::i18n::LocalizedText;
use crate::prelude::{EngineError, EngineResult, LatLng};
use crate::telemetry::LogManager;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Cross-view join key, `keychip + "/" + main`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn from_parts(keychip: &str, main: &str) -> Self {
        Self(format!("{keychip}/{main}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A sanitized device with its derived id and input position.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub index: usize,
    pub keychip: String,
    pub main: String,
    pub coordinates: LatLng,
    pub ranges: Vec<Interval>,
    pub weak_ranges: Vec<Interval>,
    pub nickname: String,
    pub store: String,
    pub en_store: String,
    pub position: String,
    pub en_position: String,
    pub kind: Option<LocalizedText>,
    pub desc: Option<LocalizedText>,
    pub evidences: Vec<LocalizedText>,
    pub video: Option<String>,
}

impl Device {
    fn from_raw(raw: RawDevice, index: usize) -> Self {
        Self {
            id: DeviceId::from_parts(&raw.ids.keychip, &raw.ids.main),
            index,
            keychip: raw.ids.keychip,
            main: raw.ids.main,
            coordinates: LatLng::new(raw.lat, raw.lng),
            ranges: raw.ranges,
            weak_ranges: raw.weak_ranges,
            nickname: raw.nickname,
            store: raw.store,
            en_store: raw.en_store,
            position: raw.position,
            en_position: raw.en_position,
            kind: raw.kind,
            desc: raw.desc,
            evidences: raw.evidences,
            video: raw.video.filter(|url| !url.is_empty()),
        }
    }

    /// Mean of the primary range midpoints; NaN when the device has none.
    pub fn mean_midpoint(&self) -> f64 {
        let midpoints = self
            .ranges
            .iter()
            .map(Interval::midpoint)
            .collect::<Vec<_>>();
        crate::math::StatsHelper::mean(&midpoints)
    }
}

/// One band's worth of data: a device paired with one of its intervals.
#[derive(Debug, Clone, Copy)]
pub struct RangeEntry<'a> {
    pub device: &'a Device,
    pub interval: Interval,
    pub is_weak: bool,
}

impl RangeEntry<'_> {
    pub fn min(&self) -> f64 {
        self.interval.min
    }

    pub fn max(&self) -> f64 {
        self.interval.max
    }
}

/// The sanitized, id-assigned dataset that every rebuild starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub metadata: Metadata,
    pub range_labels: Vec<RangeLabel>,
    pub devices: Vec<Device>,
}

impl Dataset {
    /// Parses raw JSON, sanitizes every string in it, then assigns ids.
    pub fn from_json_str(input: &str) -> EngineResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> EngineResult<Self> {
        if !value.is_object() {
            return Err(EngineError::InvalidInput(
                "dataset root must be an object".into(),
            ));
        }
        let raw: RawDataset = serde_json::from_value(sanitize(value))?;
        Ok(Self::from_raw(raw))
    }

    /// Builds a dataset from already-sanitized raw records.
    pub fn from_raw(raw: RawDataset) -> Self {
        let devices = raw
            .data
            .into_iter()
            .enumerate()
            .map(|(index, device)| Device::from_raw(device, index))
            .collect::<Vec<_>>();

        let logger = LogManager::new("dataset");
        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(&device.id) {
                logger.warn(&format!(
                    "duplicate device id {}; the later record wins on the map",
                    device.id
                ));
            }
        }

        Self {
            metadata: raw.metadata,
            range_labels: raw.range,
            devices,
        }
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().rev().find(|device| &device.id == id)
    }

    /// One entry per (device, primary range), in input order.
    pub fn flattened(&self) -> Vec<RangeEntry<'_>> {
        self.devices
            .iter()
            .flat_map(|device| {
                device.ranges.iter().map(move |interval| RangeEntry {
                    device,
                    interval: *interval,
                    is_weak: false,
                })
            })
            .collect()
    }

    /// One entry per (device, weak range), in input order.
    pub fn flattened_weak(&self) -> Vec<RangeEntry<'_>> {
        self.devices
            .iter()
            .flat_map(|device| {
                device.weak_ranges.iter().map(move |interval| RangeEntry {
                    device,
                    interval: *interval,
                    is_weak: true,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "metadata": { "members": { "a": "Alice" }, "lastUpdated": "2024-05-01" },
        "range": [ { "from": 0, "to": 20, "label": "DYE", "labelKey": "dye" } ],
        "data": [
            {
                "ids": { "keychip": "A123", "main": "M1" },
                "lat": 23.7, "lng": 121.0,
                "nickname": "<b>Cab</b>",
                "store": "Store", "enStore": "Store EN",
                "position": "1F", "enPosition": "1F",
                "type": { "en": "Rumor", "ja": "噂" },
                "ranges": [ { "min": 40, "max": 60 } ]
            },
            {
                "ids": { "keychip": "B456", "main": "M2" },
                "lat": 23.7, "lng": 121.0,
                "type": "Freely",
                "ranges": [ { "min": 10, "max": 20 }, { "min": 30, "max": 50 } ],
                "weakRanges": [ { "min": 70, "max": 80 } ]
            }
        ]
    }"#;

    #[test]
    fn ids_join_keychip_and_main() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.devices[0].id.as_str(), "A123/M1");
        assert_eq!(dataset.devices[1].id.as_str(), "B456/M2");
        assert_eq!(dataset.devices[1].index, 1);

        let unique = dataset
            .devices
            .iter()
            .map(|device| device.id.clone())
            .collect::<HashSet<_>>();
        assert_eq!(unique.len(), dataset.devices.len());
    }

    #[test]
    fn strings_are_sanitized_on_ingestion() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.devices[0].nickname, "&lt;b&gt;Cab&lt;/b&gt;");
    }

    #[test]
    fn flattening_produces_one_entry_per_range() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        let primary = dataset.flattened();
        let weak = dataset.flattened_weak();

        assert_eq!(primary.len(), 3);
        assert_eq!(weak.len(), 1);
        assert!(weak[0].is_weak);
        assert_eq!(weak[0].device.id.as_str(), "B456/M2");
        assert_eq!(primary[2].min(), 30.0);
        assert_eq!(primary[2].max(), 50.0);
    }

    #[test]
    fn metadata_is_retained() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        assert_eq!(dataset.metadata.last_updated.as_deref(), Some("2024-05-01"));
        assert_eq!(dataset.metadata.members.get("a").map(String::as_str), Some("Alice"));
        assert_eq!(dataset.range_labels[0].label_key.as_deref(), Some("dye"));
    }

    #[test]
    fn mean_midpoint_averages_every_range() {
        let dataset = Dataset::from_json_str(SAMPLE).unwrap();
        // midpoints 15 and 40
        assert_eq!(dataset.devices[1].mean_midpoint(), 27.5);
    }

    #[test]
    fn non_object_roots_are_rejected() {
        assert!(Dataset::from_json_str("[1, 2]").is_err());
        assert!(Dataset::from_json_str("not json").is_err());
    }

    #[test]
    fn null_optional_fields_read_as_empty() {
        let dataset = Dataset::from_json_str(
            r#"{ "metadata": null, "range": null, "data": [
                { "ids": { "keychip": "K1", "main": "M1" }, "lat": 23.7, "lng": 121,
                  "ranges": [ { "min": 40, "max": 60 } ],
                  "weakRanges": null, "evidences": null, "video": null },
                { "ids": { "keychip": "K2", "main": "M2" }, "lat": 23.7, "lng": 121,
                  "ranges": null, "evidences": [null, "x"] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(dataset.devices.len(), 2);
        assert!(dataset.devices[0].weak_ranges.is_empty());
        assert!(dataset.devices[0].evidences.is_empty());
        assert!(dataset.devices[1].ranges.is_empty());
        assert_eq!(
            dataset.devices[1].evidences,
            vec![
                LocalizedText::Plain(String::new()),
                LocalizedText::Plain("x".into())
            ]
        );
        assert!(dataset.range_labels.is_empty());
        assert!(dataset.metadata.members.is_empty());
    }
}
