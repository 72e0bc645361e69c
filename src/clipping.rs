//! Saturation (clipping) rates per channel and for luma.

use crate::color::luma709;
use imgref::ImgRef;
use rgb::RGB;

/// Default tolerance around 0 and 1 that counts as clipped.
pub const CLIP_EPSILON: f32 = 1e-6;

/// Fraction of samples saturated at either extreme, per channel and luma.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRates {
    /// Rec.709 luma clip rate.
    pub luma: f64,
    /// Red channel clip rate.
    pub r: f64,
    /// Green channel clip rate.
    pub g: f64,
    /// Blue channel clip rate.
    pub b: f64,
}

impl ClipRates {
    /// Per-field difference `self - other`.
    #[must_use]
    pub fn delta(&self, other: &Self) -> Self {
        Self {
            luma: self.luma - other.luma,
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Computes clip rates for an RGB image.
///
/// A sample clips when it lies within `epsilon` of 0 or of 1.
#[must_use]
pub fn clip_rates(rgb: ImgRef<'_, RGB<f32>>, epsilon: f32) -> ClipRates {
    let n = rgb.width() * rgb.height();
    if n == 0 {
        return ClipRates {
            luma: 0.0,
            r: 0.0,
            g: 0.0,
            b: 0.0,
        };
    }

    let clipped = |v: f32| v <= epsilon || v >= 1.0 - epsilon;

    let mut counts = [0usize; 3];
    for row in rgb.rows() {
        for px in row {
            counts[0] += usize::from(clipped(px.r));
            counts[1] += usize::from(clipped(px.g));
            counts[2] += usize::from(clipped(px.b));
        }
    }

    let luma = luma709(rgb);
    let luma_count = luma.data().iter().filter(|&&v| clipped(v)).count();

    ClipRates {
        luma: luma_count as f64 / n as f64,
        r: counts[0] as f64 / n as f64,
        g: counts[1] as f64 / n as f64,
        b: counts[2] as f64 / n as f64,
    }
}
