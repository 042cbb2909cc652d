//! Pure mappings from data values to pixels, colors, opacity and stroke width.

use crate::math::color::{Rgb, GREEN, RED, UNKNOWN, YELLOW};

/// Affine map from `[d0, d1]` to `[r0, r1]`, optionally clamped to the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return r0;
        }
        let mut t = (value - d0) / span;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + (r1 - r0) * t
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }
}

/// Square-root map from a non-negative domain, clamped to the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain_max: f64,
    range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain_max: f64, range: (f64, f64)) -> Self {
        Self { domain_max, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        if self.domain_max <= 0.0 {
            return r0;
        }
        let t = value.clamp(0.0, self.domain_max).sqrt() / self.domain_max.sqrt();
        r0 + (r1 - r0) * t
    }
}

/// Vertical position: `[0, 100]` onto `[inner_height, 0]`, not clamped.
pub fn vertical_scale(inner_height: f64) -> LinearScale {
    LinearScale::new((0.0, 100.0), (inner_height, 0.0))
}

/// Red at 0, yellow at 50, green at 100. Anything outside `[0, 100]` or NaN
/// maps to the neutral gray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    stops: [(f64, Rgb); 3],
    unknown: Rgb,
}

impl ColorScale {
    pub fn new() -> Self {
        Self {
            stops: [(0.0, RED), (50.0, YELLOW), (100.0, GREEN)],
            unknown: UNKNOWN,
        }
    }

    pub fn apply(&self, value: f64) -> Rgb {
        if value.is_nan() || value < self.stops[0].0 || value > self.stops[2].0 {
            return self.unknown;
        }
        let [low, mid, high] = self.stops;
        if value <= mid.0 {
            low.1.lerp(mid.1, (value - low.0) / (mid.0 - low.0))
        } else {
            mid.1.lerp(high.1, (value - mid.0) / (high.0 - mid.0))
        }
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new()
    }
}

pub const UNCERTAINTY_DOMAIN_MAX: f64 = 20.0;

/// Opacity and stroke width derived from a band's uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyScales {
    opacity: LinearScale,
    stroke_width: SqrtScale,
}

impl UncertaintyScales {
    pub fn new() -> Self {
        Self {
            opacity: LinearScale::new((0.0, UNCERTAINTY_DOMAIN_MAX), (1.0, 0.7)).clamped(),
            stroke_width: SqrtScale::new(UNCERTAINTY_DOMAIN_MAX, (3.0, 1.0)),
        }
    }

    pub fn opacity(&self, uncertainty: f64) -> f64 {
        self.opacity.apply(uncertainty)
    }

    pub fn stroke_width(&self, uncertainty: f64) -> f64 {
        self.stroke_width.apply(uncertainty)
    }
}

impl Default for UncertaintyScales {
    fn default() -> Self {
        Self::new()
    }
}
