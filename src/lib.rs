//! Image-quality evaluation for quantized and dithered output.
//!
//! Compares a quantized/dithered rendition against its source image and
//! reports the artifact classes that palette reduction actually produces:
//! structural loss (MS-SSIM), added grain and directional dither patterns
//! (spectral analysis), banding in smooth gradients, channel clipping,
//! chroma loss and CIEDE2000 color error, edge damage (GMSD), and luma PSNR.
//! Raw metrics can be folded into calibrated 0..100 scores with an overall
//! mean.
//!
//! ```
//! use quantscope::{evaluate, EvalParams, Img, ScoresRecord, RGB};
//!
//! let reference = Img::new(vec![RGB::new(0.5f32, 0.5, 0.5); 64 * 64], 64, 64);
//! let output = reference.clone();
//! let metrics = evaluate(reference.as_ref(), output.as_ref(), &EvalParams::new())?;
//! let scores = ScoresRecord::from_metrics(&metrics);
//! assert!(scores.overall.unwrap() > 99.0);
//! # Ok::<(), quantscope::EvalError>(())
//! ```
//!
//! Inputs are gamma-encoded sRGB with samples in `[0, 1]`. Pairs that differ
//! in size are brought to a common size by the configured [`AlignPolicy`].

pub mod banding;
pub mod blur;
pub mod clipping;
pub mod color;
pub mod colordiff;
mod eval;
pub mod fidelity;
pub mod image;
pub mod perceptual;
pub mod record;
mod score;
pub mod spectral;
pub mod ssim;

pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::RGB;

pub use crate::perceptual::{PerceptualError, PerceptualMetric};
pub use crate::record::{MetricsRecord, ScoresRecord};

use std::fmt;
use std::sync::Arc;

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// One of the images has a zero dimension.
    #[error("empty image ({width}x{height})")]
    EmptyImage { width: usize, height: usize },
    /// A sample is NaN or infinite.
    #[error("non-finite sample at ({x}, {y})")]
    NonFiniteSample { x: usize, y: usize },
    /// The pair differs in size and the policy is [`AlignPolicy::Reject`].
    #[error("image dimensions differ: {w1}x{h1} vs {w2}x{h2}")]
    DimensionMismatch {
        w1: usize,
        h1: usize,
        w2: usize,
        h2: usize,
    },
}

/// How to reconcile a pair whose dimensions differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignPolicy {
    /// Crop both images to the shared top-left region (the default).
    #[default]
    CropTopLeft,
    /// Bilinearly resample both images to the smaller common size.
    Resample,
    /// Refuse to evaluate mismatched pairs.
    Reject,
}

/// Evaluation parameters.
///
/// The defaults reproduce the calibrated reporting pipeline; the builders
/// exist for experiments and tests.
#[derive(Clone)]
pub struct EvalParams {
    hf_cutoff: f64,
    stripe_bins: usize,
    banding_levels: u32,
    clip_epsilon: f32,
    alignment: AlignPolicy,
    parallel: bool,
    perceptual: Option<Arc<dyn PerceptualMetric>>,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            hf_cutoff: 0.25,
            stripe_bins: 180,
            banding_levels: 32,
            clip_epsilon: 1e-6,
            alignment: AlignPolicy::CropTopLeft,
            parallel: true,
            perceptual: None,
        }
    }
}

impl fmt::Debug for EvalParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalParams")
            .field("hf_cutoff", &self.hf_cutoff)
            .field("stripe_bins", &self.stripe_bins)
            .field("banding_levels", &self.banding_levels)
            .field("clip_epsilon", &self.clip_epsilon)
            .field("alignment", &self.alignment)
            .field("parallel", &self.parallel)
            .field("perceptual", &self.perceptual.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl EvalParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized radius above which spectral energy counts as
    /// high-frequency.
    #[must_use]
    pub fn with_hf_cutoff(mut self, cutoff: f64) -> Self {
        self.hf_cutoff = cutoff;
        self
    }

    /// Number of angular bins of the stripe-score histogram.
    ///
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_stripe_bins(mut self, bins: usize) -> Self {
        self.stripe_bins = bins.max(1);
        self
    }

    /// Number of luma quantization levels of the run-length banding index.
    ///
    /// Values below 2 are clamped to 2.
    #[must_use]
    pub fn with_banding_levels(mut self, levels: u32) -> Self {
        self.banding_levels = levels.max(2);
        self
    }

    /// Distance from 0.0 / 1.0 below which a sample counts as clipped.
    #[must_use]
    pub fn with_clip_epsilon(mut self, epsilon: f32) -> Self {
        self.clip_epsilon = epsilon;
        self
    }

    /// Policy for pairs whose dimensions differ.
    #[must_use]
    pub fn with_alignment(mut self, policy: AlignPolicy) -> Self {
        self.alignment = policy;
        self
    }

    /// Runs the analyzers on the current thread when `false`.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Registers a perceptual-distance backend queried once per pair.
    #[must_use]
    pub fn with_perceptual(mut self, plugin: Arc<dyn PerceptualMetric>) -> Self {
        self.perceptual = Some(plugin);
        self
    }

    #[must_use]
    pub fn hf_cutoff(&self) -> f64 {
        self.hf_cutoff
    }

    #[must_use]
    pub fn stripe_bins(&self) -> usize {
        self.stripe_bins
    }

    #[must_use]
    pub fn banding_levels(&self) -> u32 {
        self.banding_levels
    }

    #[must_use]
    pub fn clip_epsilon(&self) -> f32 {
        self.clip_epsilon
    }

    #[must_use]
    pub fn alignment(&self) -> AlignPolicy {
        self.alignment
    }

    #[must_use]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    #[must_use]
    pub fn perceptual(&self) -> Option<&dyn PerceptualMetric> {
        self.perceptual.as_deref()
    }
}

/// Evaluates a quantized/dithered `output` against its `reference`.
///
/// Both images are gamma-encoded sRGB with samples in `[0, 1]`. Mismatched
/// dimensions are handled per [`EvalParams::with_alignment`].
///
/// # Errors
/// Returns [`EvalError::EmptyImage`] for a zero-sized input,
/// [`EvalError::NonFiniteSample`] when a sample is NaN or infinite, and
/// [`EvalError::DimensionMismatch`] under [`AlignPolicy::Reject`].
pub fn evaluate(
    reference: ImgRef<'_, RGB<f32>>,
    output: ImgRef<'_, RGB<f32>>,
    params: &EvalParams,
) -> Result<MetricsRecord, EvalError> {
    eval::validate(reference)?;
    eval::validate(output)?;
    let (reference, output) = eval::align(reference, output, params.alignment)?;
    Ok(eval::compute_metrics(
        reference.as_ref(),
        output.as_ref(),
        params,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_reporting_pipeline() {
        let params = EvalParams::new();
        assert_eq!(params.hf_cutoff(), 0.25);
        assert_eq!(params.stripe_bins(), 180);
        assert_eq!(params.banding_levels(), 32);
        assert_eq!(params.clip_epsilon(), 1e-6);
        assert_eq!(params.alignment(), AlignPolicy::CropTopLeft);
        assert!(params.parallel());
        assert!(params.perceptual().is_none());
    }

    #[test]
    fn degenerate_builder_inputs_are_clamped() {
        let params = EvalParams::new().with_stripe_bins(0).with_banding_levels(0);
        assert_eq!(params.stripe_bins(), 1);
        assert_eq!(params.banding_levels(), 2);
        assert_eq!(EvalParams::new().with_banding_levels(1).banding_levels(), 2);
    }

    #[test]
    fn debug_omits_plugin_internals() {
        let repr = format!("{:?}", EvalParams::new());
        assert!(repr.contains("perceptual: None"), "{repr}");
    }

    #[test]
    fn error_messages_carry_dimensions() {
        let err = EvalError::DimensionMismatch {
            w1: 640,
            h1: 480,
            w2: 640,
            h2: 400,
        };
        assert_eq!(
            err.to_string(),
            "image dimensions differ: 640x480 vs 640x400"
        );
    }
}
