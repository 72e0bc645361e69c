//! Banding detection: run-length index and gradient-histogram index.
//!
//! Both indices are reported as output-minus-reference deltas by the
//! evaluator; positive means the output shows longer flat plateaus or
//! stronger quantization spikes than the reference.

use crate::blur::{gaussian_blur, reflect_index};
use crate::image::PlaneF;

/// Default luma quantization levels for the run-length index.
pub const RUNLEN_LEVELS: u32 = 32;

/// Histogram bins for the gradient index.
const GRAD_BINS: usize = 128;

/// Blur parameters applied before the gradient histogram.
const GRAD_BLUR_SIZE: usize = 7;
const GRAD_BLUR_SIGMA: f32 = 1.0;

/// Run-length banding index of a luma plane.
///
/// Luma is quantized to `levels` by rounding; each row's average run length
/// (width / number of runs) is averaged over rows and normalized by width.
/// Longer flat plateaus push the index up.
#[must_use]
pub fn runlen_index(luma: &PlaneF, levels: u32) -> f64 {
    let width = luma.width();
    let height = luma.height();
    let scale = (levels - 1) as f32;
    let max_level = (levels - 1) as i32;

    let mut row_sum = 0.0f64;
    for y in 0..height {
        let row = luma.row(y);
        let mut runs = 1usize;
        let mut prev = quantize(row[0], scale, max_level);
        for &v in &row[1..] {
            let q = quantize(v, scale, max_level);
            if q != prev {
                runs += 1;
                prev = q;
            }
        }
        // Sum of run lengths is the row width, so the average run length
        // per row is width / runs.
        row_sum += width as f64 / runs as f64;
    }

    let avg_run = row_sum / height as f64;
    avg_run / width.max(1) as f64
}

#[inline]
fn quantize(v: f32, scale: f32, max_level: i32) -> i32 {
    ((v * scale + 0.5) as i32).clamp(0, max_level)
}

/// Relative run-length banding: `index(out) - index(ref)`.
#[must_use]
pub fn runlen_delta(reference: &PlaneF, output: &PlaneF, levels: u32) -> f64 {
    runlen_index(output, levels) - runlen_index(reference, levels)
}

/// Gradient-histogram banding index of a luma plane.
///
/// The blurred gradient-magnitude histogram of natural content decays
/// smoothly; quantization puts spikes at step boundaries and piles mass at
/// zero. Peakiness is the histogram mass above a fitted log-linear decay
/// envelope; zero-mass is the fraction of near-zero gradients. The index is
/// `0.6 * peakiness + 0.4 * zero_mass`.
#[must_use]
pub fn gradient_index(luma: &PlaneF) -> f64 {
    let blurred = gaussian_blur(luma, GRAD_BLUR_SIZE, GRAD_BLUR_SIGMA);
    let magnitudes = gradient_magnitude(&blurred);

    let g99 = percentile(magnitudes.data(), 99.5) + 1e-9;

    let mut hist = [0.0f64; GRAD_BINS];
    for &g in magnitudes.data() {
        let clipped = f64::from(g).clamp(0.0, g99);
        let idx = ((clipped / g99 * GRAD_BINS as f64) as usize).min(GRAD_BINS - 1);
        hist[idx] += 1.0;
    }
    for h in &mut hist {
        *h += 1e-12;
    }

    let centers: Vec<f64> = (0..GRAD_BINS)
        .map(|i| (i as f64 + 0.5) / GRAD_BINS as f64 * g99)
        .collect();

    // Log-linear least-squares fit of the upper half of the histogram.
    let half = GRAD_BINS / 2;
    let (slope, intercept) = linear_fit(
        &centers[half..],
        &hist[half..].iter().map(|&h| h.ln()).collect::<Vec<_>>(),
    );

    let total: f64 = hist.iter().sum();
    let mut residual = 0.0f64;
    for (i, &h) in hist.iter().enumerate() {
        let envelope = (intercept + slope * centers[i]).exp();
        residual += (h - envelope).max(0.0);
    }
    let peakiness = residual / total;

    let zero_thresh = 0.01 * g99;
    let zero_count = magnitudes
        .data()
        .iter()
        .filter(|&&g| f64::from(g) <= zero_thresh)
        .count();
    let zero_mass = zero_count as f64 / magnitudes.data().len() as f64;

    0.6 * peakiness + 0.4 * zero_mass
}

/// Relative gradient-histogram banding: `index(out) - index(ref)`.
#[must_use]
pub fn gradient_delta(reference: &PlaneF, output: &PlaneF) -> f64 {
    gradient_index(output) - gradient_index(reference)
}

/// Central-difference gradient magnitude with reflect border.
fn gradient_magnitude(plane: &PlaneF) -> PlaneF {
    let width = plane.width();
    let height = plane.height();
    let mut out = PlaneF::new(width, height);
    for y in 0..height {
        let up = plane.row(reflect_index(y as isize - 1, height));
        let down = plane.row(reflect_index(y as isize + 1, height));
        let row = plane.row(y);
        let out_row = out.row_mut(y);
        for x in 0..width {
            let left = row[reflect_index(x as isize - 1, width)];
            let right = row[reflect_index(x as isize + 1, width)];
            let dx = (right - left) * 0.5;
            let dy = (down[x] - up[x]) * 0.5;
            out_row[x] = (dx * dx + dy * dy).sqrt();
        }
    }
    out
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(values: &[f32], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let t = rank - lo as f64;
        sorted[lo] * (1.0 - t) + sorted[hi] * t
    }
}

/// Least-squares line `y = intercept + slope * x`.
///
/// Returns a flat line through the mean when x has no spread.
fn linear_fit(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut sxx = 0.0f64;
    let mut sxy = 0.0f64;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return (0.0, mean_y);
    }
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}
