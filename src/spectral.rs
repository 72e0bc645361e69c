//! Frequency-domain analysis: high-frequency energy ratio, angular
//! anisotropy (stripe score), and the radial power histogram.
//!
//! All three share one centered 2D power spectrum of the zero-meaned luma
//! plane. The DC component sits at `(w/2, h/2)` after the shift, matching the
//! radial/angular geometry the metrics are defined in.

use crate::image::PlaneF;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Default normalized-radius cutoff for the high-frequency ratio.
pub const HF_CUTOFF: f64 = 0.25;

/// Default number of angular bins for the stripe score.
pub const STRIPE_BINS: usize = 180;

/// Number of bins in the radial power histogram.
pub const RADIAL_BINS: usize = 256;

/// Centered 2D Fourier power spectrum (`|FFT|^2`) of a zero-meaned plane.
#[derive(Debug, Clone)]
pub struct PowerSpectrum {
    power: Vec<f64>,
    width: usize,
    height: usize,
}

impl PowerSpectrum {
    /// Computes the centered power spectrum of the given plane.
    ///
    /// The plane mean is subtracted before the transform, so the DC bin
    /// carries no energy for uniform images.
    #[must_use]
    pub fn compute(plane: &PlaneF) -> Self {
        let width = plane.width();
        let height = plane.height();
        let mean = plane.mean();

        let mut grid: Vec<Complex<f64>> = plane
            .data()
            .iter()
            .map(|&v| Complex::new(f64::from(v) - mean, 0.0))
            .collect();

        let mut planner = FftPlanner::<f64>::new();

        // Row transforms in place.
        let row_fft = planner.plan_fft_forward(width);
        for row in grid.chunks_exact_mut(width) {
            row_fft.process(row);
        }

        // Column transforms via gather/scatter.
        let col_fft = planner.plan_fft_forward(height);
        let mut column = vec![Complex::new(0.0, 0.0); height];
        for x in 0..width {
            for y in 0..height {
                column[y] = grid[y * width + x];
            }
            col_fft.process(&mut column);
            for y in 0..height {
                grid[y * width + x] = column[y];
            }
        }

        // Shift DC to the geometric center while taking |F|^2.
        let mut power = vec![0.0f64; width * height];
        for y in 0..height {
            let sy = (y + height / 2) % height;
            for x in 0..width {
                let sx = (x + width / 2) % width;
                power[sy * width + sx] = grid[y * width + x].norm_sqr();
            }
        }

        Self {
            power,
            width,
            height,
        }
    }

    /// Spectrum width (same as the source plane).
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Spectrum height (same as the source plane).
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Fraction of spectral power at normalized radius >= `cutoff`.
    ///
    /// Radius is normalized by half the image diagonal. Returns 0 when the
    /// total power is 0 (uniform input).
    #[must_use]
    pub fn high_frequency_ratio(&self, cutoff: f64) -> f64 {
        let (cy, cx) = (self.height / 2, self.width / 2);
        let half_diag = 0.5
            * ((self.height * self.height + self.width * self.width) as f64).sqrt();

        let mut high = 0.0f64;
        let mut total = 0.0f64;
        for y in 0..self.height {
            let dy = y as f64 - cy as f64;
            for x in 0..self.width {
                let dx = x as f64 - cx as f64;
                let p = self.power[y * self.width + x];
                total += p;
                let r_norm = (dy * dy + dx * dx).sqrt() / half_diag;
                if r_norm >= cutoff {
                    high += p;
                }
            }
        }

        if total == 0.0 {
            return 0.0;
        }
        high / total
    }

    /// Angular anisotropy score: `max(bin) / (mean(bin) + 1e-12)`.
    ///
    /// Angles are folded into [0, pi) to exploit the 180-degree symmetry of
    /// the power spectrum; a disk of radius `0.05 * max(h, w)` around DC is
    /// excluded. A value of 1 means isotropic; directional patterns
    /// (stripes) push it well above 1.
    #[must_use]
    pub fn stripe_score(&self, bins: usize) -> f64 {
        let (cy, cx) = (self.height / 2, self.width / 2);
        let r_min = 0.05 * self.height.max(self.width) as f64;

        let mut hist = vec![0.0f64; bins];
        for y in 0..self.height {
            let dy = y as f64 - cy as f64;
            for x in 0..self.width {
                let dx = x as f64 - cx as f64;
                if (dy * dy + dx * dx).sqrt() < r_min {
                    continue;
                }
                let mut angle = dy.atan2(dx); // [-pi, pi]
                angle = (angle + std::f64::consts::PI).rem_euclid(std::f64::consts::PI);
                let idx = ((angle / std::f64::consts::PI) * bins as f64) as usize;
                hist[idx.min(bins - 1)] += self.power[y * self.width + x];
            }
        }

        let mean = hist.iter().sum::<f64>() / bins as f64 + 1e-12;
        let max = hist.iter().copied().fold(0.0f64, f64::max);
        max / mean
    }

    /// Radial power distribution, normalized to peak 1.
    ///
    /// Bin centers are at normalized radius `(i + 0.5) / RADIAL_BINS` where 1
    /// is the largest center-to-corner distance. This is report data for
    /// external chart renderers; it carries no metric semantics.
    #[must_use]
    pub fn radial_histogram(&self) -> [f64; RADIAL_BINS] {
        let (cy, cx) = (self.height / 2, self.width / 2);

        let mut r_max = 0.0f64;
        for &(y, x) in &[(0usize, 0usize), (0, self.width - 1), (self.height - 1, 0), (self.height - 1, self.width - 1)] {
            let dy = y as f64 - cy as f64;
            let dx = x as f64 - cx as f64;
            r_max = r_max.max((dy * dy + dx * dx).sqrt());
        }

        let mut hist = [0.0f64; RADIAL_BINS];
        for y in 0..self.height {
            let dy = y as f64 - cy as f64;
            for x in 0..self.width {
                let dx = x as f64 - cx as f64;
                let r = (dy * dy + dx * dx).sqrt() / (r_max + 1e-9);
                let idx = ((r * RADIAL_BINS as f64) as usize).min(RADIAL_BINS - 1);
                hist[idx] += self.power[y * self.width + x];
            }
        }

        let peak = hist.iter().copied().fold(0.0f64, f64::max);
        if peak > 0.0 {
            for v in &mut hist {
                *v /= peak;
            }
        }
        hist
    }
}
