//! Color conversions: Rec.709 luma, sRGB linearization, CIELAB (D65).
//!
//! Inputs are gamma-encoded sRGB in [0, 1]. Luma is computed directly on the
//! encoded values (the banding/spectral analyzers are defined that way); the
//! Lab conversion linearizes first.

use crate::image::{LabImage, PlaneF};
use imgref::ImgRef;
use rgb::RGB;

/// Rec.709 luma coefficients.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// sRGB to XYZ matrix, D65 illuminant.
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// D65 reference white.
const XYZ_WHITE: [f32; 3] = [0.95047, 1.00000, 1.08883];

/// Extracts the Rec.709 luma plane from an RGB image.
///
/// `Y = 0.2126 R + 0.7152 G + 0.0722 B`, no clamping.
#[must_use]
pub fn luma709(rgb: ImgRef<'_, RGB<f32>>) -> PlaneF {
    let mut out = PlaneF::new(rgb.width(), rgb.height());
    for (y, row) in rgb.rows().enumerate() {
        let out_row = out.row_mut(y);
        for (x, px) in row.iter().enumerate() {
            out_row[x] = LUMA_R * px.r + LUMA_G * px.g + LUMA_B * px.b;
        }
    }
    out
}

/// Converts one gamma-encoded sRGB channel value to linear light.
#[inline]
#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// CIE Lab nonlinearity: cube root above `(6/29)^3`, linear ramp below.
#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Converts a single sRGB pixel (components in [0, 1]) to CIELAB.
#[must_use]
pub fn srgb_pixel_to_lab(px: RGB<f32>) -> [f32; 3] {
    let r = srgb_to_linear(px.r);
    let g = srgb_to_linear(px.g);
    let b = srgb_to_linear(px.b);

    let x = RGB_TO_XYZ[0][0] * r + RGB_TO_XYZ[0][1] * g + RGB_TO_XYZ[0][2] * b;
    let y = RGB_TO_XYZ[1][0] * r + RGB_TO_XYZ[1][1] * g + RGB_TO_XYZ[1][2] * b;
    let z = RGB_TO_XYZ[2][0] * r + RGB_TO_XYZ[2][1] * g + RGB_TO_XYZ[2][2] * b;

    let fx = lab_f(x / XYZ_WHITE[0]);
    let fy = lab_f(y / XYZ_WHITE[1]);
    let fz = lab_f(z / XYZ_WHITE[2]);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Converts an sRGB image to CIELAB planes.
#[must_use]
pub fn rgb_to_lab(rgb: ImgRef<'_, RGB<f32>>) -> LabImage {
    let mut lab = LabImage::new(rgb.width(), rgb.height());
    for (y, row) in rgb.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let [l, a, b] = srgb_pixel_to_lab(px);
            lab.l.set(x, y, l);
            lab.a.set(x, y, a);
            lab.b.set(x, y, b);
        }
    }
    lab
}

/// Chroma plane `sqrt(a^2 + b^2)` of a Lab image.
#[must_use]
pub fn chroma(lab: &LabImage) -> PlaneF {
    let mut out = PlaneF::new(lab.width(), lab.height());
    for y in 0..lab.height() {
        let a_row = lab.a.row(y);
        let b_row = lab.b.row(y);
        let out_row = out.row_mut(y);
        for x in 0..a_row.len() {
            out_row[x] = (a_row[x] * a_row[x] + b_row[x] * b_row[x]).sqrt();
        }
    }
    out
}
