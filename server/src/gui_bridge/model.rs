use serde::{Deserialize, Serialize};
use spectracore::Session;

/// Compact description of a built scene, served to HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SceneSummary {
    pub language: String,
    pub last_updated: Option<String>,
    pub members: usize,
    pub bands: Vec<BandSummary>,
    pub markers: Vec<MarkerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandSummary {
    pub id: String,
    pub min: f64,
    pub max: f64,
    pub weak: bool,
    pub fill: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerSummary {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub fill: String,
}

impl SceneSummary {
    pub fn from_session(session: &Session) -> Self {
        let Some(view) = session.view() else {
            return Self {
                language: session.language().to_string(),
                ..Default::default()
            };
        };
        let scene = view.scene();
        let metadata = &scene.dataset().metadata;

        Self {
            language: session.language().to_string(),
            last_updated: metadata.last_updated.clone(),
            members: metadata.members.len(),
            bands: scene
                .spectrum
                .bands
                .iter()
                .map(|band| BandSummary {
                    id: band.id.to_string(),
                    min: band.interval.min,
                    max: band.interval.max,
                    weak: band.is_weak,
                    fill: band.fill.to_string(),
                    tooltip: band.tooltip.clone(),
                })
                .collect(),
            markers: scene
                .map
                .markers()
                .iter()
                .map(|marker| MarkerSummary {
                    id: marker.id.to_string(),
                    lat: marker.position.lat,
                    lng: marker.position.lng,
                    fill: marker.fill.to_string(),
                })
                .collect(),
        }
    }
}
