use crate::generator::template::default_range_labels;
use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use spectracore::dataset::{DeviceIds, Interval, Metadata, RawDataset, RawDevice};
use spectracore::i18n::LocalizedText;
use std::collections::BTreeMap;

/// Configuration for generating a synthetic dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub devices: usize,
    pub seed: u64,
    pub center_lat: f64,
    pub center_lng: f64,
    /// Half-width of the scatter box in degrees.
    pub spread: f64,
    /// Every n-th device reuses the previous device's coordinates.
    pub colocated_every: usize,
    /// Every n-th device carries a weak range.
    pub weak_every: usize,
    /// Every n-th device carries a second primary range.
    pub multi_every: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            devices: 40,
            seed: 0,
            center_lat: 23.7,
            center_lng: 121.0,
            spread: 1.2,
            colocated_every: 4,
            weak_every: 3,
            multi_every: 5,
        }
    }
}

fn random_interval(rng: &mut StdRng) -> Interval {
    let width = rng.gen_range(0.0..20.0_f64);
    let min = rng.gen_range(0.0..(100.0 - width));
    Interval::new(round1(min), round1(min + width))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn localized(entries: &[(&str, String)]) -> LocalizedText {
    LocalizedText::Localized(
        entries
            .iter()
            .map(|(code, text)| (code.to_string(), text.clone()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn type_for(midpoint: f64) -> LocalizedText {
    let (zh, en) = match midpoint {
        m if m >= 54.44 => ("偏Freely", "Leans Freely"),
        m if m >= 44.44 => ("混合", "Mixed"),
        _ => ("偏DYE", "Leans DYE"),
    };
    localized(&[("zh-TW", zh.to_string()), ("en", en.to_string())])
}

pub fn build_dataset(config: &GeneratorConfig) -> anyhow::Result<RawDataset> {
    ensure!(config.spread >= 0.0, "spread must not be negative");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut data: Vec<RawDevice> = Vec::with_capacity(config.devices);

    for index in 0..config.devices {
        let (lat, lng) = match data.last() {
            Some(previous) if config.colocated_every > 0 && index % config.colocated_every == 0 => {
                (previous.lat, previous.lng)
            }
            _ => (
                config.center_lat + rng.gen_range(-config.spread..=config.spread),
                config.center_lng + rng.gen_range(-config.spread..=config.spread),
            ),
        };

        let mut ranges = vec![random_interval(&mut rng)];
        if config.multi_every > 0 && index % config.multi_every == 1 {
            ranges.push(random_interval(&mut rng));
        }
        let weak_ranges = if config.weak_every > 0 && index % config.weak_every == 2 {
            vec![random_interval(&mut rng)]
        } else {
            Vec::new()
        };

        // roughly one in six devices is untested
        let kind = if rng.gen_ratio(1, 6) {
            None
        } else {
            Some(type_for(ranges[0].midpoint()))
        };
        let evidences = (0..rng.gen_range(0..3))
            .map(|n| {
                localized(&[
                    ("zh-TW", format!("測試紀錄 #{}", n + 1)),
                    ("en", format!("Test log #{}", n + 1)),
                ])
            })
            .collect();

        data.push(RawDevice {
            ids: DeviceIds {
                keychip: format!("A{:08}", 63000000 + index),
                main: format!("M{:03}", index % 1000),
            },
            lat,
            lng,
            nickname: format!("Cabinet {}", index + 1),
            store: format!("店舖{}", index / 2 + 1),
            en_store: format!("Store {}", index / 2 + 1),
            position: format!("{}F", index % 3 + 1),
            en_position: format!(" {}F", index % 3 + 1),
            kind,
            desc: None,
            evidences,
            video: None,
            ranges,
            weak_ranges,
        });
    }

    Ok(RawDataset {
        metadata: Metadata {
            members: BTreeMap::new(),
            last_updated: Some("1970-01-01".into()),
        },
        range: default_range_labels(),
        data,
    })
}
