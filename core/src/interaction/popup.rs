//! Detail popup shared by the spectrum bands and the map markers.

use crate::dataset::{Device, DeviceId};
use crate::i18n::{resolve, Catalog, CatalogKey, Locale};
use crate::prelude::{LatLng, Point};
use serde::Serialize;

/// Viewports narrower than this dock the popup instead of anchoring it.
pub const SMALL_SCREEN_WIDTH: f64 = 768.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoLink {
    pub url: String,
    pub label: String,
}

/// Resolved, display-ready popup fields for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupContent {
    pub nickname: String,
    pub location: String,
    pub en_location: String,
    pub keychip: String,
    pub main: String,
    pub type_label: String,
    /// Resolved type, or the "not tested" placeholder.
    pub type_text: String,
    pub tested: bool,
    pub description: Option<String>,
    pub evidence_heading: String,
    /// Never empty when present.
    pub evidences: Option<Vec<String>>,
    pub video: Option<VideoLink>,
}

impl PopupContent {
    pub fn build(device: &Device, catalog: &Catalog, locale: &Locale) -> Self {
        let kind = resolve(device.kind.as_ref(), locale);
        let tested = !kind.is_empty();
        let type_text = if tested {
            kind
        } else {
            catalog.text(CatalogKey::NotTested).to_string()
        };

        let description = Some(resolve(device.desc.as_ref(), locale)).filter(|text| !text.is_empty());

        let evidences = device
            .evidences
            .iter()
            .map(|evidence| evidence.resolve(locale).to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>();

        let video = device.video.as_ref().map(|url| VideoLink {
            url: url.clone(),
            label: catalog.text(CatalogKey::WatchVideo).to_string(),
        });

        Self {
            nickname: device.nickname.clone(),
            location: format!("{}{}", device.store, device.position),
            en_location: format!("{}{}", device.en_store, device.en_position),
            keychip: device.keychip.clone(),
            main: device.main.clone(),
            type_label: catalog.text(CatalogKey::MachineType).to_string(),
            type_text,
            tested,
            description,
            evidence_heading: catalog.text(CatalogKey::Evidences).to_string(),
            evidences: Some(evidences).filter(|list| !list.is_empty()),
            video,
        }
    }

    pub fn type_line(&self) -> String {
        format!("{}：{}", self.type_label, self.type_text)
    }

    /// Popup body markup. Field values were sanitized on ingestion and are
    /// inserted unescaped.
    pub fn to_html(&self) -> String {
        let description = self
            .description
            .as_ref()
            .map(|text| {
                format!(
                    r#"<div style="margin-top:8px; font-size:0.9em; text-align:left; color:#555;">{text}</div>"#
                )
            })
            .unwrap_or_default();

        let evidences = self
            .evidences
            .as_ref()
            .map(|list| {
                let items = list
                    .iter()
                    .map(|item| format!("<li>{item}</li>"))
                    .collect::<String>();
                format!(
                    r#"<div style="margin-top:8px; text-align:left;"><div style="font-size:0.85em; font-weight:bold; color:#666; margin-bottom:4px;">{heading}：</div><ul style="margin:0; padding-left:20px; font-size:0.85em; color:#555;">{items}</ul></div>"#,
                    heading = self.evidence_heading,
                )
            })
            .unwrap_or_default();

        let video = self
            .video
            .as_ref()
            .map(|link| {
                format!(
                    r#"<div style="margin-top:8px;"><a href="{url}" target="_blank" style="color:#39c5bb; text-decoration:none; font-weight:bold;"><i class="fa-solid fa-video"></i> {label}</a></div>"#,
                    url = link.url,
                    label = link.label,
                )
            })
            .unwrap_or_default();

        format!(
            r#"<div style="text-align:center; padding:5px;"><strong style="font-size:1.1em; color:#39c5bb;">{nickname}</strong><hr style="margin:5px 0; opacity:0.3;"><div style="margin-bottom:4px;"><span>{location}</span><br /><span class="text-muted">{en_location}</span><br /><span class="text-muted small">Keychip ID: {keychip}</span><br /><span class="text-muted small">Main ID: {main}</span></div><div style="background:#f5f5f5; padding:4px; border-radius:4px; display:inline-block; font-size:0.9em;">{type_label}：<span style="color:#e12885; font-weight:bold;">{type_text}</span></div>{description}{evidences}{video}</div>"#,
            nickname = self.nickname,
            location = self.location,
            en_location = self.en_location,
            keychip = self.keychip,
            main = self.main,
            type_label = self.type_label,
            type_text = self.type_text,
        )
    }
}

/// An open popup: which device, where it points, and what it says.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub id: DeviceId,
    /// The device's collision-adjusted marker position.
    pub anchor: LatLng,
    pub content: PopupContent,
}

/// Where the host should put an open popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupPlacement {
    /// Next to the marker, at this screen position.
    Anchored(Point),
    /// Full width along the bottom edge.
    Docked,
}

pub fn placement(viewport_width: f64, anchor: Point) -> PopupPlacement {
    if viewport_width < SMALL_SCREEN_WIDTH {
        PopupPlacement::Docked
    } else {
        PopupPlacement::Anchored(anchor)
    }
}
