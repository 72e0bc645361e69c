//! Edge and global fidelity: GMSD and luma PSNR.

use crate::blur::reflect_index;
use crate::image::PlaneF;

/// Stabilization constant of the gradient-similarity map.
const GMS_C: f64 = 0.0026;

/// PSNR value reported when the images are numerically identical.
pub const PSNR_CAP: f64 = 99.0;

/// 3x3 gradient kernels, normalized by 4.
#[rustfmt::skip]
const KERNEL_X: [[f32; 3]; 3] = [
    [0.25, 0.0, -0.25],
    [0.50, 0.0, -0.50],
    [0.25, 0.0, -0.25],
];
#[rustfmt::skip]
const KERNEL_Y: [[f32; 3]; 3] = [
    [ 0.25,  0.50,  0.25],
    [ 0.00,  0.00,  0.00],
    [-0.25, -0.50, -0.25],
];

/// Gradient Magnitude Similarity Deviation between two luma planes.
///
/// Forms the per-pixel map `(2 g1 g2 + c) / (g1^2 + g2^2 + c)` from the 3x3
/// gradient magnitudes of both planes and reports its population standard
/// deviation. 0 means the edge structures agree everywhere.
///
/// # Panics
/// Panics if the planes differ in shape.
#[must_use]
pub fn gmsd(reference: &PlaneF, output: &PlaneF) -> f64 {
    assert!(reference.same_size(output));
    let width = reference.width();
    let height = reference.height();
    let n = width * height;

    let gm_ref = kernel_magnitude(reference);
    let gm_out = kernel_magnitude(output);

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for i in 0..n {
        let g1 = f64::from(gm_ref.data()[i]) + 1e-12;
        let g2 = f64::from(gm_out.data()[i]) + 1e-12;
        let gms = (2.0 * g1 * g2 + GMS_C) / (g1 * g1 + g2 * g2 + GMS_C);
        sum += gms;
        sum_sq += gms * gms;
    }

    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    variance.sqrt()
}

/// 3x3 cross-correlation gradient magnitude with reflect border.
fn kernel_magnitude(plane: &PlaneF) -> PlaneF {
    let width = plane.width();
    let height = plane.height();
    let mut out = PlaneF::new(width, height);
    for y in 0..height {
        let rows = [
            plane.row(reflect_index(y as isize - 1, height)),
            plane.row(y),
            plane.row(reflect_index(y as isize + 1, height)),
        ];
        let out_row = out.row_mut(y);
        for x in 0..width {
            let mut gx = 0.0f32;
            let mut gy = 0.0f32;
            for dy in 0..3 {
                for dx in 0..3 {
                    let sx = reflect_index(x as isize + dx as isize - 1, width);
                    let v = rows[dy][sx];
                    gx += KERNEL_X[dy][dx] * v;
                    gy += KERNEL_Y[dy][dx] * v;
                }
            }
            out_row[x] = (gx * gx + gy * gy).sqrt();
        }
    }
    out
}

/// Luma PSNR over the unit dynamic range, in dB.
///
/// Returns [`PSNR_CAP`] when the mean-squared error drops below 1e-12.
///
/// # Panics
/// Panics if the planes differ in shape.
#[must_use]
pub fn psnr_luma(reference: &PlaneF, output: &PlaneF) -> f64 {
    assert!(reference.same_size(output));
    let n = reference.data().len();
    let mse: f64 = reference
        .data()
        .iter()
        .zip(output.data().iter())
        .map(|(&r, &o)| {
            let d = f64::from(r) - f64::from(o);
            d * d
        })
        .sum::<f64>()
        / n as f64;

    if mse <= 1e-12 {
        return PSNR_CAP;
    }
    10.0 * (1.0 / mse).log10()
}
