//! Optional perceptual-distance plugin interface.
//!
//! Learned metrics (LPIPS-style backbones) live outside this crate; the
//! evaluator queries a registered plugin once per image pair and treats any
//! failure as "metric unavailable" rather than an evaluation error.

use imgref::ImgRef;
use rgb::RGB;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Error type plugins may return; the evaluator only logs it.
pub type PerceptualError = Box<dyn std::error::Error + Send + Sync>;

/// A perceptual-distance backend comparing two aligned RGB images.
///
/// Implementations must return a finite distance where 0 means identical;
/// the scale is backend-specific. Distances are read through
/// [`invoke`](fn@invoke), which also contains panics from misbehaving
/// backends.
pub trait PerceptualMetric: Send + Sync {
    /// Backend identifier (e.g. a network name) used in logs.
    fn name(&self) -> &str;

    /// Computes the perceptual distance between two equally-sized images.
    ///
    /// # Errors
    /// Returns an error when the backend cannot produce a distance; the
    /// caller records the metric as unavailable.
    fn distance(
        &self,
        reference: ImgRef<'_, RGB<f32>>,
        output: ImgRef<'_, RGB<f32>>,
    ) -> Result<f64, PerceptualError>;
}

/// Invokes a plugin, converting every failure mode into `None`.
///
/// Errors, panics, and non-finite results all degrade to an unavailable
/// metric; nothing propagates to the evaluation result.
#[must_use]
pub fn invoke(
    plugin: &dyn PerceptualMetric,
    reference: ImgRef<'_, RGB<f32>>,
    output: ImgRef<'_, RGB<f32>>,
) -> Option<f64> {
    let result = catch_unwind(AssertUnwindSafe(|| plugin.distance(reference, output)));
    match result {
        Ok(Ok(d)) if d.is_finite() => Some(d),
        Ok(Ok(d)) => {
            tracing::warn!(plugin = plugin.name(), value = d, "non-finite perceptual distance discarded");
            None
        }
        Ok(Err(err)) => {
            tracing::warn!(plugin = plugin.name(), error = %err, "perceptual plugin failed");
            None
        }
        Err(_) => {
            tracing::warn!(plugin = plugin.name(), "perceptual plugin panicked");
            None
        }
    }
}
