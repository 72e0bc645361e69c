//! Maps raw metrics onto hand-calibrated 0..100 scores.
//!
//! Each curve is monotone with a metric-specific noticeability threshold
//! (e.g. a 5-unit CIEDE2000 threshold, a 25..45 dB PSNR knee). Relative
//! metrics only penalize degradation: a negative delta (output cleaner than
//! the reference) scores a full 100.

use crate::record::{MetricsRecord, ScoresRecord};

/// Exponential decay constant for the grain (high-frequency delta) curve.
const GRAIN_K: f64 = 0.02;
/// Decay constant for the stripe-score delta curve; a delta of 0.5 is
/// clearly noticeable.
const STRIPE_K: f64 = 0.5;
/// Decay constant for the run-length banding delta.
const BANDING_RUNLEN_K: f64 = 0.02;
/// Decay constant for the gradient-histogram banding delta.
const BANDING_GRAD_K: f64 = 0.05;
/// Clip-rate delta treated as total failure.
const CLIP_FLOOR: f64 = 0.10;
/// Chroma loss in Lab units treated as total failure.
const CHROMA_FLOOR: f64 = 3.0;
/// CIEDE2000 mean treated as total failure; 2-5 is noticeable.
const DE00_FLOOR: f64 = 5.0;
/// GMSD value treated as total failure.
const GMSD_FLOOR: f64 = 0.10;
/// PSNR knee: 25 dB scores 0, 45 dB scores 100.
const PSNR_LO: f64 = 25.0;
const PSNR_RANGE: f64 = 20.0;
/// Perceptual distance treated as total failure.
const PERCEPTUAL_FLOOR: f64 = 1.0;

#[inline]
fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// `100 * exp(-max(0, x) / k)`; 100 at or below zero.
#[inline]
fn inv_exp(x: f64, k: f64) -> f64 {
    100.0 * (-x.max(0.0) / k).exp()
}

impl ScoresRecord {
    /// Derives the 0..100 score record from raw metrics.
    ///
    /// An unavailable perceptual metric stays unavailable; it is excluded
    /// from `overall` rather than coerced to zero.
    #[must_use]
    pub fn from_metrics(metrics: &MetricsRecord) -> Self {
        let ms_ssim = 100.0 * metrics.ms_ssim.powi(4);

        let grain = if metrics.hf_ratio_delta <= 0.0 {
            100.0
        } else {
            inv_exp(metrics.hf_ratio_delta, GRAIN_K)
        };

        let stripe = inv_exp(metrics.stripe_rel, STRIPE_K);
        let banding_runlen = inv_exp(metrics.banding_runlen_rel, BANDING_RUNLEN_K);
        let banding_grad = inv_exp(metrics.banding_grad_rel, BANDING_GRAD_K);

        let worst_clip = [
            metrics.clip_luma_rel,
            metrics.clip_r_rel,
            metrics.clip_g_rel,
            metrics.clip_b_rel,
        ]
        .into_iter()
        .fold(0.0f64, f64::max);
        let clipping = 100.0 * (1.0 - clamp01(worst_clip / CLIP_FLOOR)).sqrt();

        let chroma = 100.0 * (1.0 - clamp01(metrics.chroma_delta_mean / CHROMA_FLOOR));
        let delta_e00 = 100.0 * (1.0 - clamp01(metrics.delta_e00_mean / DE00_FLOOR));
        let gmsd = 100.0 * (1.0 - clamp01(metrics.gmsd / GMSD_FLOOR));
        let psnr_y = 100.0 * clamp01((metrics.psnr_y - PSNR_LO) / PSNR_RANGE).powf(0.6);

        let perceptual = metrics
            .perceptual
            .map(|d| 100.0 * (1.0 - clamp01(d / PERCEPTUAL_FLOOR)).sqrt());

        let mut record = Self {
            ms_ssim,
            grain,
            stripe,
            banding_runlen,
            banding_grad,
            clipping,
            chroma,
            delta_e00,
            gmsd,
            psnr_y,
            perceptual,
            overall: None,
        };
        record.overall = record.compute_overall();
        record
    }

    /// Mean of the available scores; `None` iff every score is unavailable.
    fn compute_overall(&self) -> Option<f64> {
        let values: Vec<f64> = self
            .entries()
            .iter()
            .filter(|(name, _)| *name != "Overall")
            .filter_map(|&(_, v)| v)
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perfect_metrics() -> MetricsRecord {
        MetricsRecord {
            ms_ssim: 1.0,
            hf_ratio_ref: 0.1,
            hf_ratio_out: 0.1,
            hf_ratio_delta: 0.0,
            stripe_ref: 1.0,
            stripe_out: 1.0,
            stripe_rel: 0.0,
            banding_runlen_rel: 0.0,
            banding_grad_rel: 0.0,
            clip_luma_ref: 0.0,
            clip_r_ref: 0.0,
            clip_g_ref: 0.0,
            clip_b_ref: 0.0,
            clip_luma_out: 0.0,
            clip_r_out: 0.0,
            clip_g_out: 0.0,
            clip_b_out: 0.0,
            clip_luma_rel: 0.0,
            clip_r_rel: 0.0,
            clip_g_rel: 0.0,
            clip_b_rel: 0.0,
            chroma_delta_mean: 0.0,
            delta_e00_mean: 0.0,
            gmsd: 0.0,
            psnr_y: 99.0,
            perceptual: None,
        }
    }

    #[test]
    fn perfect_metrics_score_one_hundred() {
        let scores = ScoresRecord::from_metrics(&perfect_metrics());
        assert!((scores.ms_ssim - 100.0).abs() < 1e-9);
        assert!((scores.grain - 100.0).abs() < 1e-9);
        assert!((scores.stripe - 100.0).abs() < 1e-9);
        assert!((scores.banding_runlen - 100.0).abs() < 1e-9);
        assert!((scores.clipping - 100.0).abs() < 1e-9);
        assert!((scores.delta_e00 - 100.0).abs() < 1e-9);
        assert!((scores.gmsd - 100.0).abs() < 1e-9);
        assert!((scores.psnr_y - 100.0).abs() < 1e-9);
        assert!(scores.perceptual.is_none());
        assert!((scores.overall.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn improvements_are_not_penalized() {
        let mut metrics = perfect_metrics();
        metrics.hf_ratio_delta = -0.05; // output less grainy than reference
        metrics.stripe_rel = -0.3;
        metrics.banding_runlen_rel = -0.01;
        let scores = ScoresRecord::from_metrics(&metrics);
        assert!((scores.grain - 100.0).abs() < 1e-9);
        assert!((scores.stripe - 100.0).abs() < 1e-9);
        assert!((scores.banding_runlen - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degradations_lower_scores_monotonically() {
        let mut mild = perfect_metrics();
        mild.delta_e00_mean = 1.0;
        let mut severe = perfect_metrics();
        severe.delta_e00_mean = 4.0;
        let s_mild = ScoresRecord::from_metrics(&mild);
        let s_severe = ScoresRecord::from_metrics(&severe);
        assert!(s_mild.delta_e00 > s_severe.delta_e00);
        assert!(s_severe.delta_e00 > 0.0);
    }

    #[test]
    fn psnr_knee_endpoints() {
        let mut metrics = perfect_metrics();
        metrics.psnr_y = 25.0;
        assert!(ScoresRecord::from_metrics(&metrics).psnr_y.abs() < 1e-9);
        metrics.psnr_y = 45.0;
        assert!((ScoresRecord::from_metrics(&metrics).psnr_y - 100.0).abs() < 1e-9);
        metrics.psnr_y = 20.0; // below the knee clamps to zero
        assert!(ScoresRecord::from_metrics(&metrics).psnr_y.abs() < 1e-9);
    }

    #[test]
    fn worst_channel_drives_clipping_score() {
        let mut metrics = perfect_metrics();
        metrics.clip_b_rel = 0.10;
        let scores = ScoresRecord::from_metrics(&metrics);
        assert!(scores.clipping.abs() < 1e-9);
        // A clip improvement on another channel doesn't mask it.
        metrics.clip_r_rel = -0.5;
        let scores = ScoresRecord::from_metrics(&metrics);
        assert!(scores.clipping.abs() < 1e-9);
    }

    #[test]
    fn perceptual_score_present_when_metric_is() {
        let mut metrics = perfect_metrics();
        metrics.perceptual = Some(0.25);
        let scores = ScoresRecord::from_metrics(&metrics);
        let p = scores.perceptual.unwrap();
        assert!((p - 100.0 * 0.75f64.sqrt()).abs() < 1e-9);
        assert!(scores.overall.is_some());
    }

    #[test]
    fn overall_averages_available_scores() {
        let scores = ScoresRecord {
            ms_ssim: 80.0,
            grain: 100.0,
            stripe: 100.0,
            banding_runlen: 100.0,
            banding_grad: 100.0,
            clipping: 100.0,
            chroma: 100.0,
            delta_e00: 100.0,
            gmsd: 100.0,
            psnr_y: 20.0,
            perceptual: None,
            overall: None,
        };
        let overall = scores.compute_overall().unwrap();
        assert!((overall - 900.0 / 10.0).abs() < 1e-9);

        // With the perceptual score present it joins the mean.
        let with_perceptual = ScoresRecord {
            perceptual: Some(0.0),
            ..scores
        };
        let overall = with_perceptual.compute_overall().unwrap();
        assert!((overall - 900.0 / 11.0).abs() < 1e-9);
    }
}
