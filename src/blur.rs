//! Separable Gaussian filtering with reflect boundary handling.
//!
//! This is the shared spatial primitive: SSIM local statistics and the
//! gradient-histogram banding index both build on it. The boundary mode
//! mirrors NumPy's `reflect` padding: the edge sample is not repeated, and
//! reflection recurses when the kernel overhangs a plane smaller than the
//! kernel radius (which happens at the coarsest MS-SSIM level).

use crate::image::PlaneF;

/// Computes a 1D Gaussian kernel of the given size, normalized to unit sum.
#[must_use]
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size as f32 - 1.0) / 2.0;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = (i as f32 - center) / sigma;
            (-0.5 * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Maps a possibly out-of-range index onto `0..len` by mirror reflection
/// about the edge samples.
#[inline]
pub(crate) fn reflect_index(i: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    if len == 1 {
        return 0;
    }
    let last = (len - 1) as isize;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Applies a 1D kernel separably (rows, then columns) with reflect boundary.
///
/// Output dimensions equal input dimensions.
#[must_use]
pub fn separable_filter(input: &PlaneF, kernel: &[f32]) -> PlaneF {
    let width = input.width();
    let height = input.height();
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass.
    let mut tmp = PlaneF::new(width, height);
    for y in 0..height {
        let row_in = input.row(y);
        let row_out = tmp.row_mut(y);
        for x in 0..width {
            let mut acc = 0.0f32;
            for (j, &k) in kernel.iter().enumerate() {
                let sx = reflect_index(x as isize + j as isize - half, width);
                acc += k * row_in[sx];
            }
            row_out[x] = acc;
        }
    }

    // Vertical pass.
    let mut out = PlaneF::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (j, &k) in kernel.iter().enumerate() {
                let sy = reflect_index(y as isize + j as isize - half, height);
                acc += k * tmp.get(x, sy);
            }
            out.set(x, y, acc);
        }
    }

    out
}

/// Gaussian blur with an explicit kernel size and sigma.
#[must_use]
pub fn gaussian_blur(input: &PlaneF, size: usize, sigma: f32) -> PlaneF {
    let kernel = gaussian_kernel(size, sigma);
    separable_filter(input, &kernel)
}
