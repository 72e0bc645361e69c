//! Single-scale SSIM and the 5-level multiscale variant, computed on luma.

use crate::blur::{gaussian_kernel, separable_filter};
use crate::image::PlaneF;

/// Gaussian window size for local SSIM statistics.
pub const SSIM_WINDOW: usize = 11;
/// Gaussian window sigma for local SSIM statistics.
pub const SSIM_SIGMA: f32 = 1.5;

/// Stabilization constants for unit dynamic range: `C1=(0.01)^2`, `C2=(0.03)^2`.
const C1: f64 = 0.01 * 0.01;
const C2: f64 = 0.03 * 0.03;

/// Number of scales in the multiscale pyramid.
pub const MS_SSIM_LEVELS: usize = 5;

/// Per-level weights from Wang et al. 2003.
pub const MS_SSIM_WEIGHTS: [f64; MS_SSIM_LEVELS] = [0.0448, 0.2856, 0.3001, 0.2363, 0.1333];

// Level count and weight table length must agree; this is a build-time
// invariant of the pyramid, not a per-call condition.
const _: () = assert!(MS_SSIM_WEIGHTS.len() == MS_SSIM_LEVELS);

/// Computes single-scale SSIM between two luma planes of identical shape.
///
/// Local means, variances, and covariance come from an 11-tap Gaussian window
/// (sigma 1.5). The mean of the SSIM map is clamped to [0, 1].
///
/// # Panics
/// Panics if the planes differ in shape.
#[must_use]
pub fn ssim(x: &PlaneF, y: &PlaneF) -> f64 {
    assert!(x.same_size(y));
    let kernel = gaussian_kernel(SSIM_WINDOW, SSIM_SIGMA);

    let mu_x = separable_filter(x, &kernel);
    let mu_y = separable_filter(y, &kernel);
    let xx = separable_filter(&multiply(x, x), &kernel);
    let yy = separable_filter(&multiply(y, y), &kernel);
    let xy = separable_filter(&multiply(x, y), &kernel);

    let n = x.width() * x.height();
    let mut sum = 0.0f64;
    for i in 0..n {
        let mx = f64::from(mu_x.data()[i]);
        let my = f64::from(mu_y.data()[i]);
        let sigma_x2 = f64::from(xx.data()[i]) - mx * mx;
        let sigma_y2 = f64::from(yy.data()[i]) - my * my;
        let sigma_xy = f64::from(xy.data()[i]) - mx * my;

        let numerator = (2.0 * mx * my + C1) * (2.0 * sigma_xy + C2);
        let denominator = (mx * mx + my * my + C1) * (sigma_x2 + sigma_y2 + C2);
        sum += numerator / (denominator + 1e-12);
    }

    (sum / n as f64).clamp(0.0, 1.0)
}

/// 2x downsample via 2x2 average pooling; odd trailing rows/columns are dropped.
#[must_use]
pub fn downsample2(input: &PlaneF) -> PlaneF {
    let w2 = input.width() / 2;
    let h2 = input.height() / 2;
    let mut out = PlaneF::new(w2, h2);
    for y in 0..h2 {
        let top = input.row(2 * y);
        let bottom = input.row(2 * y + 1);
        let out_row = out.row_mut(y);
        for x in 0..w2 {
            out_row[x] = 0.25 * (top[2 * x] + top[2 * x + 1] + bottom[2 * x] + bottom[2 * x + 1]);
        }
    }
    out
}

/// Computes 5-level multiscale SSIM between two luma planes.
///
/// Each level after the first halves both planes by average pooling; the
/// result is the weighted sum of per-level SSIM divided by the weight sum.
/// When a dimension is too small to pool again, the remaining levels reuse
/// the coarsest valid plane, so the result stays finite for every non-empty
/// input.
///
/// # Panics
/// Panics if the planes differ in shape.
#[must_use]
pub fn ms_ssim(x: &PlaneF, y: &PlaneF) -> f64 {
    assert!(x.same_size(y));
    let mut cur_x = x.clone();
    let mut cur_y = y.clone();
    let mut weighted = 0.0f64;
    for (level, &weight) in MS_SSIM_WEIGHTS.iter().enumerate() {
        weighted += weight * ssim(&cur_x, &cur_y);
        if level + 1 < MS_SSIM_LEVELS && cur_x.width() >= 2 && cur_x.height() >= 2 {
            cur_x = downsample2(&cur_x);
            cur_y = downsample2(&cur_y);
        }
    }
    let weight_sum: f64 = MS_SSIM_WEIGHTS.iter().sum();
    weighted / weight_sum
}

fn multiply(a: &PlaneF, b: &PlaneF) -> PlaneF {
    let data = a
        .data()
        .iter()
        .zip(b.data().iter())
        .map(|(&x, &y)| x * y)
        .collect();
    PlaneF::from_vec(data, a.width(), a.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_plane(width: usize, height: usize) -> PlaneF {
        let data = (0..width * height)
            .map(|i| (i % width) as f32 / width as f32)
            .collect();
        PlaneF::from_vec(data, width, height)
    }

    #[test]
    fn identical_planes_score_one() {
        let plane = gradient_plane(64, 64);
        let s = ssim(&plane, &plane);
        assert!((s - 1.0).abs() < 1e-6, "ssim={s}");
        let ms = ms_ssim(&plane, &plane);
        assert!((ms - 1.0).abs() < 1e-3, "ms_ssim={ms}");
    }

    #[test]
    fn degraded_plane_scores_below_one() {
        let reference = gradient_plane(64, 64);
        let mut noisy = reference.clone();
        for (i, v) in noisy.row_mut(10).iter_mut().enumerate() {
            *v = if i % 2 == 0 { 0.0 } else { 1.0 };
        }
        let s = ssim(&reference, &noisy);
        assert!(s < 1.0);
        assert!(s > 0.0);
    }

    #[test]
    fn ms_ssim_stays_in_unit_range() {
        let a = gradient_plane(48, 40);
        let b = PlaneF::filled(48, 40, 0.9);
        let ms = ms_ssim(&a, &b);
        assert!((0.0..=1.0).contains(&ms), "ms_ssim={ms}");
    }

    #[test]
    fn downsample_halves_dimensions_and_averages() {
        let plane = PlaneF::from_vec(vec![0.0, 1.0, 1.0, 0.0, 0.5, 0.5], 2, 3);
        let down = downsample2(&plane);
        assert_eq!(down.width(), 1);
        assert_eq!(down.height(), 1);
        assert!((down.get(0, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downsample_truncates_odd_dimensions() {
        let plane = PlaneF::new(5, 7);
        let down = downsample2(&plane);
        assert_eq!(down.width(), 2);
        assert_eq!(down.height(), 3);
    }

    #[test]
    fn small_planes_keep_the_pyramid_finite() {
        // 15x15 pools down to 1x1 before the last level; the coarsest valid
        // plane is reused instead of descending to a zero-sized one.
        let a = PlaneF::filled(15, 15, 0.5);
        let b = PlaneF::filled(15, 15, 0.6);
        let ms = ms_ssim(&a, &b);
        assert!(ms.is_finite());
        assert!((0.0..=1.0).contains(&ms), "ms_ssim={ms}");

        let identical = gradient_plane(15, 15);
        let ms = ms_ssim(&identical, &identical);
        assert!((ms - 1.0).abs() < 1e-3, "ms_ssim={ms}");
    }

    #[test]
    fn single_column_plane_is_supported() {
        let a = PlaneF::filled(1, 32, 0.5);
        let mut b = a.clone();
        b.set(0, 7, 0.9);
        let ms = ms_ssim(&a, &b);
        assert!(ms.is_finite());
        assert!((0.0..=1.0).contains(&ms), "ms_ssim={ms}");
    }

    #[test]
    fn uniform_offset_gives_high_but_imperfect_score() {
        let a = PlaneF::filled(64, 64, 0.5);
        let b = PlaneF::filled(64, 64, 0.51);
        let ms = ms_ssim(&a, &b);
        assert!(ms < 1.0, "ms_ssim={ms}");
        assert!(ms > 0.99, "ms_ssim={ms}");
    }
}
