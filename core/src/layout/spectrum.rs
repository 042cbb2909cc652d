use crate::dataset::{DeviceId, Interval, RangeEntry};
use crate::i18n::{rare_label, resolve, CatalogKey, Locale};
use crate::layout::style::BandStyle;
use crate::math::color::{GREEN, RED, YELLOW};
use crate::math::{vertical_scale, ColorScale, LinearScale, Rgb};
use crate::prelude::{
    EngineError, EngineResult, LayoutConfig, Point, Rect, RenderInput, RenderStage,
};
use crate::telemetry::LogManager;
use serde::Serialize;

const BAR_OFFSET: f64 = 15.0;
const BAR_WIDTH: f64 = 100.0;
const BAND_OFFSET: f64 = 60.0;
const BAND_WIDTH: f64 = 10.0;
const LANE_COUNT: usize = 7;
const LANE_SPACING: f64 = 10.0;
/// Degenerate intervals still get this many pixels.
pub const MIN_BAND_HEIGHT: f64 = 2.0;

/// Horizontal lane offset for a device, cycling through seven centered lanes.
pub fn lane_offset(index: usize) -> f64 {
    ((index % LANE_COUNT) as f64 - (LANE_COUNT / 2) as f64) * LANE_SPACING
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
    pub label_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    /// Fraction of the bar height measured from the bottom.
    pub offset: f64,
    pub color: Rgb,
}

/// The background bar the bands are drawn over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientBar {
    pub rect: Rect,
    pub corner_radius: f64,
    pub opacity: f64,
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub stops: Vec<GradientStop>,
}

impl GradientBar {
    fn new(rect: Rect) -> Self {
        let stops = [
            (0.0, RED),
            (0.10, RED),
            (0.4444, YELLOW),
            (0.5444, YELLOW),
            (0.90, GREEN),
            (1.0, GREEN),
        ]
        .into_iter()
        .map(|(offset, color)| GradientStop { offset, color })
        .collect();

        Self {
            rect,
            corner_radius: 6.0,
            opacity: 0.8,
            stroke: Rgb::from_hex(0xdddddd),
            stroke_width: 1.0,
            stops,
        }
    }

    /// Color of the bar at `fraction` of its height from the bottom.
    pub fn color_at(&self, fraction: f64) -> Rgb {
        let fraction = fraction.clamp(0.0, 1.0);
        for pair in self.stops.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if fraction <= high.offset {
                let span = high.offset - low.offset;
                if span <= 0.0 {
                    return high.color;
                }
                return low.color.lerp(high.color, (fraction - low.offset) / span);
            }
        }
        self.stops.last().map(|stop| stop.color).unwrap_or(GREEN)
    }
}

/// One drawn interval of one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub id: DeviceId,
    pub device_index: usize,
    pub interval: Interval,
    pub is_weak: bool,
    pub rect: Rect,
    pub corner_radius: f64,
    pub fill: Rgb,
    pub tooltip: String,
    pub style: BandStyle,
}

impl Band {
    pub fn baseline(&self) -> BandStyle {
        BandStyle::baseline(&self.interval, self.is_weak)
    }
}

/// Everything the spectrum view draws for one rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumScene {
    pub width: f64,
    pub height: f64,
    pub bar: GradientBar,
    pub range_labels: Vec<TextLabel>,
    pub top_caption: TextLabel,
    pub bottom_caption: TextLabel,
    /// Primary bands first, then weak bands, in draw order.
    pub bands: Vec<Band>,
}

impl SpectrumScene {
    /// Topmost band under `point`.
    pub fn band_at(&self, point: Point) -> Option<&Band> {
        self.bands.iter().rev().find(|band| band.rect.contains(point))
    }

    pub fn bands_for<'a>(&'a self, id: &'a DeviceId) -> impl Iterator<Item = &'a Band> + 'a {
        self.bands.iter().filter(move |band| &band.id == id)
    }
}

/// Builds the vertical spectrum chart.
pub struct SpectrumRenderer {
    config: Option<LayoutConfig>,
    y_scale: Option<LinearScale>,
    color: ColorScale,
    logger: LogManager,
}

impl SpectrumRenderer {
    pub fn new() -> Self {
        Self {
            config: None,
            y_scale: None,
            color: ColorScale::new(),
            logger: LogManager::new("spectrum"),
        }
    }

    fn band(
        &self,
        config: &LayoutConfig,
        y: &LinearScale,
        entry: &RangeEntry<'_>,
        locale: &Locale,
    ) -> Band {
        let top = y.apply(entry.max());
        let bottom = y.apply(entry.min());
        let rect = Rect {
            x: config.margin_left + BAND_OFFSET + lane_offset(entry.device.index),
            y: config.margin_top + top,
            width: BAND_WIDTH,
            height: (bottom - top).max(MIN_BAND_HEIGHT),
        };

        let kind = resolve(entry.device.kind.as_ref(), locale);
        let tooltip = if entry.is_weak {
            format!(
                "{} {}：{}",
                rare_label(&locale.active),
                entry.device.nickname,
                kind
            )
        } else {
            format!("{}：{}", entry.device.nickname, kind)
        };

        Band {
            id: entry.device.id.clone(),
            device_index: entry.device.index,
            interval: entry.interval,
            is_weak: entry.is_weak,
            rect,
            corner_radius: 3.0,
            fill: self.color.apply(entry.interval.midpoint()),
            tooltip,
            style: BandStyle::baseline(&entry.interval, entry.is_weak),
        }
    }
}

impl Default for SpectrumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for SpectrumRenderer {
    type Output = SpectrumScene;

    fn initialize(&mut self, config: &LayoutConfig) -> EngineResult<()> {
        if config.inner_height() <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "spectrum height {} leaves no room inside the margins",
                config.height
            )));
        }
        self.y_scale = Some(vertical_scale(config.inner_height()));
        self.config = Some(config.clone());
        Ok(())
    }

    fn render(&mut self, input: &RenderInput<'_>) -> EngineResult<SpectrumScene> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| EngineError::Internal("spectrum renderer not initialized".into()))?;
        let y = self
            .y_scale
            .as_ref()
            .ok_or_else(|| EngineError::Internal("vertical scale not configured".into()))?;

        let inner_height = config.inner_height();
        let bar_rect = Rect {
            x: config.margin_left + BAR_OFFSET,
            y: config.margin_top,
            width: BAR_WIDTH,
            height: inner_height,
        };
        let caption_x = bar_rect.x + bar_rect.width / 2.0;

        let range_labels = input
            .dataset
            .range_labels
            .iter()
            .map(|range| {
                let text = range
                    .label_key
                    .as_deref()
                    .and_then(|key| input.catalog.range_label(key))
                    .unwrap_or(&range.label)
                    .to_string();
                TextLabel {
                    text,
                    position: Point::new(
                        config.margin_left,
                        config.margin_top + y.apply(range.midpoint()) + 4.0,
                    ),
                    anchor: TextAnchor::End,
                    label_key: range.label_key.clone(),
                }
            })
            .collect();

        let top_caption = TextLabel {
            text: input.catalog.text(CatalogKey::SpectrumTop).to_string(),
            position: Point::new(caption_x, bar_rect.y - 12.0),
            anchor: TextAnchor::Middle,
            label_key: None,
        };
        let bottom_caption = TextLabel {
            text: input.catalog.text(CatalogKey::SpectrumBottom).to_string(),
            position: Point::new(caption_x, bar_rect.y + inner_height + 24.0),
            anchor: TextAnchor::Middle,
            label_key: None,
        };

        let bands = input
            .dataset
            .flattened()
            .iter()
            .chain(input.dataset.flattened_weak().iter())
            .map(|entry| self.band(config, y, entry, input.locale))
            .collect::<Vec<_>>();

        self.logger.record(&format!(
            "{} bands, {} range labels",
            bands.len(),
            input.dataset.range_labels.len()
        ));

        Ok(SpectrumScene {
            width: config.width,
            height: config.height,
            bar: GradientBar::new(bar_rect),
            range_labels,
            top_caption,
            bottom_caption,
            bands,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
        self.y_scale = None;
    }
}
