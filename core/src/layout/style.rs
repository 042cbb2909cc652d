use crate::dataset::Interval;
use crate::math::{Rgb, UncertaintyScales};
use serde::{Deserialize, Serialize};

const BAND_STROKE: Rgb = Rgb::from_hex(0x333333);
const BAND_STROKE_HIGHLIGHTED: Rgb = Rgb::from_hex(0x000000);
const WEAK_BAND_STROKE: Rgb = Rgb::from_hex(0xbbbbbb);
const WEAK_BAND_STROKE_HIGHLIGHTED: Rgb = Rgb::from_hex(0x888888);

const WEAK_OPACITY_FACTOR: f64 = 0.4;
const WEAK_STROKE_FACTOR: f64 = 0.7;

pub const WEAK_DASH: [f64; 2] = [2.0, 2.0];
pub const WEAK_DASH_HIGHLIGHTED: [f64; 2] = [3.0, 3.0];

/// Mutable presentation of one spectrum band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStyle {
    pub opacity: f64,
    pub stroke: Option<Rgb>,
    pub stroke_width: f64,
    pub dash: Option<[f64; 2]>,
}

impl BandStyle {
    /// Resting style, recomputed from the band's own interval.
    pub fn baseline(interval: &Interval, is_weak: bool) -> Self {
        let scales = UncertaintyScales::new();
        let uncertainty = interval.uncertainty();
        let opacity = scales.opacity(uncertainty);
        let stroke_width = scales.stroke_width(uncertainty);
        if is_weak {
            Self {
                opacity: opacity * WEAK_OPACITY_FACTOR,
                stroke: Some(WEAK_BAND_STROKE),
                stroke_width: stroke_width * WEAK_STROKE_FACTOR,
                dash: Some(WEAK_DASH),
            }
        } else {
            Self {
                opacity,
                stroke: Some(BAND_STROKE),
                stroke_width,
                dash: None,
            }
        }
    }

    /// Style of a band that belongs to the highlighted device.
    pub fn highlighted(is_weak: bool) -> Self {
        if is_weak {
            Self {
                opacity: 0.7,
                stroke: Some(WEAK_BAND_STROKE_HIGHLIGHTED),
                stroke_width: 2.0,
                dash: Some(WEAK_DASH_HIGHLIGHTED),
            }
        } else {
            Self {
                opacity: 1.0,
                stroke: Some(BAND_STROKE_HIGHLIGHTED),
                stroke_width: 3.0,
                dash: None,
            }
        }
    }

    /// Style of every other band while some device is highlighted.
    pub fn dimmed(is_weak: bool) -> Self {
        if is_weak {
            Self {
                opacity: 0.1,
                stroke: None,
                stroke_width: 0.0,
                dash: Some(WEAK_DASH),
            }
        } else {
            Self {
                opacity: 0.2,
                stroke: None,
                stroke_width: 0.0,
                dash: None,
            }
        }
    }
}

/// Mutable presentation of one map marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub radius: f64,
    pub weight: f64,
    pub border: Rgb,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub const BASELINE: MarkerStyle = MarkerStyle {
        radius: 8.0,
        weight: 1.5,
        border: Rgb::from_hex(0x555555),
        opacity: 1.0,
        fill_opacity: 0.85,
    };

    pub const HIGHLIGHTED: MarkerStyle = MarkerStyle {
        radius: 14.0,
        weight: 3.0,
        border: Rgb::from_hex(0x333333),
        opacity: 1.0,
        fill_opacity: 1.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_baseline_compounds_the_primary_scales() {
        let interval = Interval::new(40.0, 50.0);
        let primary = BandStyle::baseline(&interval, false);
        let weak = BandStyle::baseline(&interval, true);
        assert!((weak.opacity - primary.opacity * 0.4).abs() < 1e-12);
        assert!((weak.stroke_width - primary.stroke_width * 0.7).abs() < 1e-12);
        assert_eq!(weak.dash, Some(WEAK_DASH));
        assert_eq!(primary.dash, None);
    }

    #[test]
    fn tight_intervals_are_opaque_and_thick() {
        let style = BandStyle::baseline(&Interval::new(50.0, 50.0), false);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.stroke_width, 3.0);
        assert_eq!(style.stroke, Some(BAND_STROKE));
    }

    #[test]
    fn dimmed_bands_lose_their_border() {
        assert_eq!(BandStyle::dimmed(false).stroke, None);
        assert_eq!(BandStyle::dimmed(true).stroke_width, 0.0);
        assert!(BandStyle::highlighted(false).opacity > BandStyle::dimmed(false).opacity);
    }
}
