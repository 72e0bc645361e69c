//! Flat metric and score records consumed by external serializers.
//!
//! Wire keys are kept byte-identical to the original reporting tool so JSON
//! and CSV consumers keep working. The optional perceptual-distance metric is
//! an `Option<f64>` that serializes to `null` when unavailable; it is never
//! encoded as NaN.

use serde::Serialize;

/// Raw metric values for one evaluated image pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    /// Multiscale structural similarity, [0, 1], higher is better.
    #[serde(rename = "MS-SSIM")]
    pub ms_ssim: f64,
    /// High-frequency energy ratio of the reference.
    #[serde(rename = "HighFreqRatio_ref")]
    pub hf_ratio_ref: f64,
    /// High-frequency energy ratio of the output.
    #[serde(rename = "HighFreqRatio_out")]
    pub hf_ratio_out: f64,
    /// `out - ref` high-frequency ratio; positive means added grain.
    #[serde(rename = "HighFreqRatio_delta")]
    pub hf_ratio_delta: f64,
    /// Spectral anisotropy of the reference.
    #[serde(rename = "StripeScore_ref")]
    pub stripe_ref: f64,
    /// Spectral anisotropy of the output.
    #[serde(rename = "StripeScore_out")]
    pub stripe_out: f64,
    /// `out - ref` stripe score; positive means added directional patterns.
    #[serde(rename = "StripeScore_rel")]
    pub stripe_rel: f64,
    /// Run-length banding delta, `out - ref`.
    #[serde(rename = "BandingIndex_rel")]
    pub banding_runlen_rel: f64,
    /// Gradient-histogram banding delta, `out - ref`.
    #[serde(rename = "BandingIndex_grad_rel")]
    pub banding_grad_rel: f64,
    /// Luma clip rate of the reference.
    #[serde(rename = "ClipRate_L_ref")]
    pub clip_luma_ref: f64,
    /// Red clip rate of the reference.
    #[serde(rename = "ClipRate_R_ref")]
    pub clip_r_ref: f64,
    /// Green clip rate of the reference.
    #[serde(rename = "ClipRate_G_ref")]
    pub clip_g_ref: f64,
    /// Blue clip rate of the reference.
    #[serde(rename = "ClipRate_B_ref")]
    pub clip_b_ref: f64,
    /// Luma clip rate of the output.
    #[serde(rename = "ClipRate_L_out")]
    pub clip_luma_out: f64,
    /// Red clip rate of the output.
    #[serde(rename = "ClipRate_R_out")]
    pub clip_r_out: f64,
    /// Green clip rate of the output.
    #[serde(rename = "ClipRate_G_out")]
    pub clip_g_out: f64,
    /// Blue clip rate of the output.
    #[serde(rename = "ClipRate_B_out")]
    pub clip_b_out: f64,
    /// Luma clip-rate delta, `out - ref`.
    #[serde(rename = "ClipRate_L_rel")]
    pub clip_luma_rel: f64,
    /// Red clip-rate delta.
    #[serde(rename = "ClipRate_R_rel")]
    pub clip_r_rel: f64,
    /// Green clip-rate delta.
    #[serde(rename = "ClipRate_G_rel")]
    pub clip_g_rel: f64,
    /// Blue clip-rate delta.
    #[serde(rename = "ClipRate_B_rel")]
    pub clip_b_rel: f64,
    /// Mean absolute chroma difference in CIELAB.
    #[serde(rename = "Δ Chroma_mean")]
    pub chroma_delta_mean: f64,
    /// Mean CIEDE2000 distance.
    #[serde(rename = "Δ E00_mean")]
    pub delta_e00_mean: f64,
    /// Gradient magnitude similarity deviation; lower is better.
    #[serde(rename = "GMSD")]
    pub gmsd: f64,
    /// Luma PSNR in dB, capped at 99.0.
    #[serde(rename = "PSNR_Y")]
    pub psnr_y: f64,
    /// Optional learned perceptual distance; `None` when the plugin is
    /// missing or failed.
    #[serde(rename = "Perceptual")]
    pub perceptual: Option<f64>,
}

impl MetricsRecord {
    /// Key/value view for CSV-style consumers, in report order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("MS-SSIM", Some(self.ms_ssim)),
            ("HighFreqRatio_ref", Some(self.hf_ratio_ref)),
            ("HighFreqRatio_out", Some(self.hf_ratio_out)),
            ("HighFreqRatio_delta", Some(self.hf_ratio_delta)),
            ("StripeScore_ref", Some(self.stripe_ref)),
            ("StripeScore_out", Some(self.stripe_out)),
            ("StripeScore_rel", Some(self.stripe_rel)),
            ("BandingIndex_rel", Some(self.banding_runlen_rel)),
            ("BandingIndex_grad_rel", Some(self.banding_grad_rel)),
            ("ClipRate_L_ref", Some(self.clip_luma_ref)),
            ("ClipRate_R_ref", Some(self.clip_r_ref)),
            ("ClipRate_G_ref", Some(self.clip_g_ref)),
            ("ClipRate_B_ref", Some(self.clip_b_ref)),
            ("ClipRate_L_out", Some(self.clip_luma_out)),
            ("ClipRate_R_out", Some(self.clip_r_out)),
            ("ClipRate_G_out", Some(self.clip_g_out)),
            ("ClipRate_B_out", Some(self.clip_b_out)),
            ("ClipRate_L_rel", Some(self.clip_luma_rel)),
            ("ClipRate_R_rel", Some(self.clip_r_rel)),
            ("ClipRate_G_rel", Some(self.clip_g_rel)),
            ("ClipRate_B_rel", Some(self.clip_b_rel)),
            ("Δ Chroma_mean", Some(self.chroma_delta_mean)),
            ("Δ E00_mean", Some(self.delta_e00_mean)),
            ("GMSD", Some(self.gmsd)),
            ("PSNR_Y", Some(self.psnr_y)),
            ("Perceptual", self.perceptual),
        ]
    }
}

/// Normalized 0..100 scores derived from a [`MetricsRecord`].
///
/// All entries are "higher is better". `overall` is the arithmetic mean of
/// the available scores and is `None` only when every contributing score is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoresRecord {
    /// Structural similarity score.
    #[serde(rename = "MS-SSIM")]
    pub ms_ssim: f64,
    /// Added-grain score from the high-frequency ratio delta.
    #[serde(rename = "Grain")]
    pub grain: f64,
    /// Directional-pattern score from the stripe-score delta.
    #[serde(rename = "Stripe")]
    pub stripe: f64,
    /// Run-length banding score.
    #[serde(rename = "Banding(runlen)")]
    pub banding_runlen: f64,
    /// Gradient-histogram banding score.
    #[serde(rename = "Banding(grad)")]
    pub banding_grad: f64,
    /// Clipping score from the worst positive clip-rate delta.
    #[serde(rename = "Clipping")]
    pub clipping: f64,
    /// Chroma-preservation score.
    #[serde(rename = "Δ Chroma")]
    pub chroma: f64,
    /// CIEDE2000 score.
    #[serde(rename = "Δ E00")]
    pub delta_e00: f64,
    /// Edge-fidelity score.
    #[serde(rename = "GMSD")]
    pub gmsd: f64,
    /// Luma PSNR score.
    #[serde(rename = "PSNR_Y")]
    pub psnr_y: f64,
    /// Perceptual-distance score; `None` when the metric was unavailable.
    #[serde(rename = "Perceptual")]
    pub perceptual: Option<f64>,
    /// Mean of the available scores.
    #[serde(rename = "Overall")]
    pub overall: Option<f64>,
}

impl ScoresRecord {
    /// Key/value view for CSV-style consumers, in report order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("MS-SSIM", Some(self.ms_ssim)),
            ("Grain", Some(self.grain)),
            ("Stripe", Some(self.stripe)),
            ("Banding(runlen)", Some(self.banding_runlen)),
            ("Banding(grad)", Some(self.banding_grad)),
            ("Clipping", Some(self.clipping)),
            ("Δ Chroma", Some(self.chroma)),
            ("Δ E00", Some(self.delta_e00)),
            ("GMSD", Some(self.gmsd)),
            ("PSNR_Y", Some(self.psnr_y)),
            ("Perceptual", self.perceptual),
            ("Overall", self.overall),
        ]
    }
}
