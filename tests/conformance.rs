//! End-to-end evaluation behavior on synthetic image pairs.

use quantscope::{
    evaluate, AlignPolicy, EvalError, EvalParams, Img, ImgRef, ImgVec, PerceptualError,
    PerceptualMetric, ScoresRecord, RGB,
};
use std::sync::Arc;

fn solid(width: usize, height: usize, v: f32) -> ImgVec<RGB<f32>> {
    Img::new(vec![RGB::new(v, v, v); width * height], width, height)
}

/// Horizontal sRGB ramp, identical rows.
fn ramp(width: usize, height: usize) -> ImgVec<RGB<f32>> {
    let mut pixels = Vec::with_capacity(width * height);
    for _ in 0..height {
        for x in 0..width {
            let v = x as f32 / (width - 1) as f32;
            pixels.push(RGB::new(v, v, v));
        }
    }
    Img::new(pixels, width, height)
}

/// Deterministic pseudo-noise in [-amp, amp].
fn add_noise(img: &mut ImgVec<RGB<f32>>, amp: f32) {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    for px in img.pixels_mut() {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let u = ((state >> 33) as f32 / (1u64 << 31) as f32) - 1.0;
        let v = (px.r + u * amp).clamp(0.0, 1.0);
        *px = RGB::new(v, v, v);
    }
}

#[test]
fn identical_pair_is_a_fixed_point() {
    let img = ramp(64, 48);
    let metrics = evaluate(img.as_ref(), img.as_ref(), &EvalParams::new()).unwrap();

    assert!(metrics.ms_ssim > 0.9999, "{}", metrics.ms_ssim);
    assert_eq!(metrics.psnr_y, 99.0);
    assert!(metrics.hf_ratio_delta.abs() < 1e-12);
    assert!(metrics.stripe_rel.abs() < 1e-12);
    assert!(metrics.banding_runlen_rel.abs() < 1e-12);
    assert!(metrics.banding_grad_rel.abs() < 1e-12);
    assert!(metrics.clip_luma_rel.abs() < 1e-12);
    assert!(metrics.chroma_delta_mean.abs() < 1e-12);
    assert!(metrics.delta_e00_mean.abs() < 1e-12);
    assert!(metrics.gmsd < 1e-9);
    assert!(metrics.perceptual.is_none());

    let scores = ScoresRecord::from_metrics(&metrics);
    assert!(scores.overall.unwrap() > 99.9);
}

#[test]
fn uniform_brightness_offset() {
    let reference = solid(64, 64, 0.50);
    let output = solid(64, 64, 0.51);
    let metrics = evaluate(reference.as_ref(), output.as_ref(), &EvalParams::new()).unwrap();

    // Uniform offset of 0.01 is MSE 1e-4, exactly 40 dB.
    assert!((metrics.psnr_y - 40.0).abs() < 0.01, "{}", metrics.psnr_y);
    // Constant planes carry no structure; MS-SSIM stays near but below 1.
    assert!(metrics.ms_ssim < 1.0);
    assert!(metrics.ms_ssim > 0.99);
    // Both spectra are pure DC, so the relative spectral metrics vanish.
    assert!(metrics.hf_ratio_delta.abs() < 1e-12);
    assert!(metrics.stripe_rel.abs() < 1e-12);
    assert!(metrics.banding_runlen_rel.abs() < 1e-12);
    assert!(metrics.banding_grad_rel.abs() < 1e-12);
    // Nothing sits near 0.0 or 1.0.
    assert_eq!(metrics.clip_luma_ref, 0.0);
    assert_eq!(metrics.clip_luma_out, 0.0);
    // A small neutral lightness shift is under one CIEDE2000 unit.
    assert!(metrics.delta_e00_mean > 0.0);
    assert!(metrics.delta_e00_mean < 2.0);
    // Neutral axis both sides: no chroma to lose.
    assert!(metrics.chroma_delta_mean < 1e-3);
    assert!(metrics.gmsd < 1e-6);
}

#[test]
fn added_noise_registers_as_grain() {
    let reference = solid(96, 96, 0.5);
    let mut noisy = reference.clone();
    add_noise(&mut noisy, 0.05);

    let metrics = evaluate(reference.as_ref(), noisy.as_ref(), &EvalParams::new()).unwrap();
    assert!(
        metrics.hf_ratio_delta > 0.1,
        "delta={}",
        metrics.hf_ratio_delta
    );

    let scores = ScoresRecord::from_metrics(&metrics);
    assert!(scores.grain < 10.0, "grain={}", scores.grain);
}

#[test]
fn quantized_ramp_registers_as_banding() {
    let reference = ramp(256, 64);
    let mut banded = reference.clone();
    for px in banded.pixels_mut() {
        let v = (px.r * 7.0).round() / 7.0;
        *px = RGB::new(v, v, v);
    }

    let metrics = evaluate(reference.as_ref(), banded.as_ref(), &EvalParams::new()).unwrap();
    assert!(
        metrics.banding_runlen_rel > 0.01,
        "runlen={}",
        metrics.banding_runlen_rel
    );
    assert!(
        metrics.banding_grad_rel > 0.0,
        "grad={}",
        metrics.banding_grad_rel
    );
}

#[test]
fn desaturation_registers_as_chroma_loss() {
    let width = 32;
    let colorful: Vec<RGB<f32>> = (0..width * width)
        .map(|i| {
            if i % 2 == 0 {
                RGB::new(0.8, 0.2, 0.2)
            } else {
                RGB::new(0.2, 0.6, 0.8)
            }
        })
        .collect();
    let reference = Img::new(colorful, width, width);
    let gray: ImgVec<RGB<f32>> = Img::new(
        reference
            .pixels()
            .map(|px| {
                let y = 0.2126 * px.r + 0.7152 * px.g + 0.0722 * px.b;
                RGB::new(y, y, y)
            })
            .collect(),
        width,
        width,
    );

    let metrics = evaluate(reference.as_ref(), gray.as_ref(), &EvalParams::new()).unwrap();
    assert!(
        metrics.chroma_delta_mean > 10.0,
        "chroma={}",
        metrics.chroma_delta_mean
    );
    assert!(metrics.delta_e00_mean > 5.0, "de00={}", metrics.delta_e00_mean);

    let scores = ScoresRecord::from_metrics(&metrics);
    assert!(scores.chroma < 1e-9);
    assert!(scores.delta_e00 < 1e-9);
}

#[test]
fn blown_highlights_register_as_clipping() {
    let reference = solid(32, 32, 0.9);
    let mut clipped = reference.clone();
    for (i, px) in clipped.pixels_mut().enumerate() {
        if i % 4 == 0 {
            *px = RGB::new(1.0, 1.0, 1.0);
        }
    }

    let metrics = evaluate(reference.as_ref(), clipped.as_ref(), &EvalParams::new()).unwrap();
    assert!((metrics.clip_luma_out - 0.25).abs() < 1e-9);
    assert!((metrics.clip_luma_rel - 0.25).abs() < 1e-9);
    assert_eq!(metrics.clip_luma_ref, 0.0);

    let scores = ScoresRecord::from_metrics(&metrics);
    assert!(scores.clipping < 1e-9);
}

#[test]
fn small_images_evaluate_cleanly() {
    // 15 pixels per side shrinks to 1x1 inside the MS-SSIM pyramid.
    let reference = solid(15, 15, 0.5);
    let output = solid(15, 15, 0.6);
    let metrics = evaluate(reference.as_ref(), output.as_ref(), &EvalParams::new()).unwrap();
    assert!(metrics.ms_ssim.is_finite());
    assert!(
        (0.0..=1.0).contains(&metrics.ms_ssim),
        "ms_ssim={}",
        metrics.ms_ssim
    );

    let scores = ScoresRecord::from_metrics(&metrics);
    assert!(scores.ms_ssim.is_finite());
    assert!(scores.overall.unwrap().is_finite());
}

#[test]
fn results_are_deterministic() {
    let reference = ramp(64, 64);
    let mut output = reference.clone();
    add_noise(&mut output, 0.02);
    let params = EvalParams::new();

    let a = evaluate(reference.as_ref(), output.as_ref(), &params).unwrap();
    let b = evaluate(reference.as_ref(), output.as_ref(), &params).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let sequential = evaluate(
        reference.as_ref(),
        output.as_ref(),
        &params.clone().with_parallel(false),
    )
    .unwrap();
    assert_eq!(a, sequential);
}

#[test]
fn mismatched_pair_is_cropped_by_default() {
    let reference = ramp(80, 64);
    let output = ramp(64, 80);
    let metrics = evaluate(reference.as_ref(), output.as_ref(), &EvalParams::new()).unwrap();
    // Shared 64x64 region of the two ramps differs only through the ramp
    // scale, so the result is finite and well-formed.
    assert!(metrics.ms_ssim.is_finite());
    assert!(metrics.psnr_y.is_finite());
}

#[test]
fn reject_policy_refuses_mismatched_pair() {
    let reference = solid(64, 64, 0.5);
    let output = solid(64, 60, 0.5);
    let result = evaluate(
        reference.as_ref(),
        output.as_ref(),
        &EvalParams::new().with_alignment(AlignPolicy::Reject),
    );
    assert!(matches!(result, Err(EvalError::DimensionMismatch { .. })));
}

#[test]
fn resample_policy_handles_mismatched_pair() {
    let reference = solid(64, 64, 0.5);
    let output = solid(48, 48, 0.5);
    let metrics = evaluate(
        reference.as_ref(),
        output.as_ref(),
        &EvalParams::new().with_alignment(AlignPolicy::Resample),
    )
    .unwrap();
    assert_eq!(metrics.psnr_y, 99.0);
}

#[test]
fn non_finite_input_is_rejected() {
    let mut img = solid(16, 16, 0.5);
    img[(5usize, 5usize)] = RGB::new(f32::INFINITY, 0.5, 0.5);
    let reference = solid(16, 16, 0.5);
    let result = evaluate(reference.as_ref(), img.as_ref(), &EvalParams::new());
    assert!(matches!(
        result,
        Err(EvalError::NonFiniteSample { x: 5, y: 5 })
    ));
}

#[test]
fn empty_input_is_rejected() {
    let empty: ImgVec<RGB<f32>> = Img::new_stride(vec![], 0, 0, 1);
    let img = solid(16, 16, 0.5);
    let result = evaluate(empty.as_ref(), img.as_ref(), &EvalParams::new());
    assert!(matches!(result, Err(EvalError::EmptyImage { .. })));
}

struct HalfMsSsim;

impl PerceptualMetric for HalfMsSsim {
    fn name(&self) -> &str {
        "half-distance"
    }

    fn distance(
        &self,
        _reference: ImgRef<'_, RGB<f32>>,
        _output: ImgRef<'_, RGB<f32>>,
    ) -> Result<f64, PerceptualError> {
        Ok(0.5)
    }
}

struct Unavailable;

impl PerceptualMetric for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn distance(
        &self,
        _reference: ImgRef<'_, RGB<f32>>,
        _output: ImgRef<'_, RGB<f32>>,
    ) -> Result<f64, PerceptualError> {
        Err("model weights missing".into())
    }
}

#[test]
fn perceptual_plugin_feeds_the_record() {
    let img = solid(32, 32, 0.5);
    let params = EvalParams::new().with_perceptual(Arc::new(HalfMsSsim));
    let metrics = evaluate(img.as_ref(), img.as_ref(), &params).unwrap();
    assert_eq!(metrics.perceptual, Some(0.5));

    let scores = ScoresRecord::from_metrics(&metrics);
    let p = scores.perceptual.unwrap();
    assert!((p - 100.0 * 0.5f64.sqrt()).abs() < 1e-9);
}

#[test]
fn failing_plugin_degrades_to_unavailable() {
    let img = solid(32, 32, 0.5);
    let params = EvalParams::new().with_perceptual(Arc::new(Unavailable));
    let metrics = evaluate(img.as_ref(), img.as_ref(), &params).unwrap();
    assert_eq!(metrics.perceptual, None);

    let scores = ScoresRecord::from_metrics(&metrics);
    assert!(scores.perceptual.is_none());
    // Remaining scores still produce an overall mean.
    assert!(scores.overall.unwrap() > 99.0);
}

#[test]
fn wire_keys_are_stable() {
    let img = solid(16, 16, 0.5);
    let metrics = evaluate(img.as_ref(), img.as_ref(), &EvalParams::new()).unwrap();
    let json = serde_json::to_value(&metrics).unwrap();
    for key in [
        "MS-SSIM",
        "HighFreqRatio_delta",
        "StripeScore_rel",
        "BandingIndex_rel",
        "BandingIndex_grad_rel",
        "ClipRate_L_rel",
        "Δ Chroma_mean",
        "Δ E00_mean",
        "GMSD",
        "PSNR_Y",
        "Perceptual",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }

    let scores = serde_json::to_value(ScoresRecord::from_metrics(&metrics)).unwrap();
    for key in ["Grain", "Stripe", "Banding(runlen)", "Banding(grad)", "Overall"] {
        assert!(scores.get(key).is_some(), "missing key {key}");
    }
}
