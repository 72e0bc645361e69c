//! Evaluation orchestration: input validation, pair alignment, analyzer
//! fan-out, and metric record assembly.
//!
//! Every analyzer reads the same two immutable images and writes its own
//! outputs, so the fan-out needs no synchronization beyond the final join.

use crate::banding;
use crate::clipping;
use crate::color;
use crate::colordiff;
use crate::fidelity;
use crate::image::PlaneF;
use crate::perceptual;
use crate::record::MetricsRecord;
use crate::spectral::PowerSpectrum;
use crate::ssim;
use crate::{AlignPolicy, EvalError, EvalParams};
use imgref::{Img, ImgRef, ImgVec};
use rgb::RGB;

/// Rejects empty images and non-finite samples.
pub(crate) fn validate(img: ImgRef<'_, RGB<f32>>) -> Result<(), EvalError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(EvalError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }
    for (y, row) in img.rows().enumerate() {
        for (x, px) in row.iter().enumerate() {
            if !(px.r.is_finite() && px.g.is_finite() && px.b.is_finite()) {
                return Err(EvalError::NonFiniteSample { x, y });
            }
        }
    }
    Ok(())
}

/// Brings both images to a common size according to the alignment policy.
pub(crate) fn align(
    reference: ImgRef<'_, RGB<f32>>,
    output: ImgRef<'_, RGB<f32>>,
    policy: AlignPolicy,
) -> Result<(ImgVec<RGB<f32>>, ImgVec<RGB<f32>>), EvalError> {
    let width = reference.width().min(output.width());
    let height = reference.height().min(output.height());

    match policy {
        AlignPolicy::Reject => {
            if reference.width() != output.width() || reference.height() != output.height() {
                return Err(EvalError::DimensionMismatch {
                    w1: reference.width(),
                    h1: reference.height(),
                    w2: output.width(),
                    h2: output.height(),
                });
            }
            Ok((crop(reference, width, height), crop(output, width, height)))
        }
        AlignPolicy::CropTopLeft => {
            Ok((crop(reference, width, height), crop(output, width, height)))
        }
        AlignPolicy::Resample => Ok((
            resample_bilinear(reference, width, height),
            resample_bilinear(output, width, height),
        )),
    }
}

/// Copies the top-left `width x height` region.
fn crop(img: ImgRef<'_, RGB<f32>>, width: usize, height: usize) -> ImgVec<RGB<f32>> {
    let mut pixels = Vec::with_capacity(width * height);
    for row in img.rows().take(height) {
        pixels.extend_from_slice(&row[..width]);
    }
    Img::new(pixels, width, height)
}

/// Bilinear resample to `width x height`.
fn resample_bilinear(img: ImgRef<'_, RGB<f32>>, width: usize, height: usize) -> ImgVec<RGB<f32>> {
    if img.width() == width && img.height() == height {
        return crop(img, width, height);
    }
    let sx = img.width() as f32 / width as f32;
    let sy = img.height() as f32 / height as f32;
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let fy = ((y as f32 + 0.5) * sy - 0.5).max(0.0);
        let y0 = (fy as usize).min(img.height() - 1);
        let y1 = (y0 + 1).min(img.height() - 1);
        let ty = fy - y0 as f32;
        for x in 0..width {
            let fx = ((x as f32 + 0.5) * sx - 0.5).max(0.0);
            let x0 = (fx as usize).min(img.width() - 1);
            let x1 = (x0 + 1).min(img.width() - 1);
            let tx = fx - x0 as f32;

            let mix = |a: RGB<f32>, b: RGB<f32>, t: f32| {
                RGB::new(
                    a.r + (b.r - a.r) * t,
                    a.g + (b.g - a.g) * t,
                    a.b + (b.b - a.b) * t,
                )
            };
            let top = mix(img[(x0, y0)], img[(x1, y0)], tx);
            let bottom = mix(img[(x0, y1)], img[(x1, y1)], tx);
            pixels.push(mix(top, bottom, ty));
        }
    }
    Img::new(pixels, width, height)
}

struct SpectralPart {
    hf_ratio_ref: f64,
    hf_ratio_out: f64,
    stripe_ref: f64,
    stripe_out: f64,
}

struct BandingPart {
    runlen_rel: f64,
    grad_rel: f64,
}

struct ColorPart {
    chroma_delta_mean: f64,
    delta_e00_mean: f64,
}

struct FidelityPart {
    clip_ref: clipping::ClipRates,
    clip_out: clipping::ClipRates,
    gmsd: f64,
    psnr_y: f64,
}

/// Computes all metrics for an aligned image pair.
pub(crate) fn compute_metrics(
    reference: ImgRef<'_, RGB<f32>>,
    output: ImgRef<'_, RGB<f32>>,
    params: &EvalParams,
) -> MetricsRecord {
    tracing::debug!(
        width = reference.width(),
        height = reference.height(),
        parallel = params.parallel(),
        "evaluating aligned pair"
    );

    let ref_luma = color::luma709(reference);
    let out_luma = color::luma709(output);

    let spectral_part = |ref_luma: &PlaneF, out_luma: &PlaneF| {
        let ref_spectrum = PowerSpectrum::compute(ref_luma);
        let out_spectrum = PowerSpectrum::compute(out_luma);
        SpectralPart {
            hf_ratio_ref: ref_spectrum.high_frequency_ratio(params.hf_cutoff()),
            hf_ratio_out: out_spectrum.high_frequency_ratio(params.hf_cutoff()),
            stripe_ref: ref_spectrum.stripe_score(params.stripe_bins()),
            stripe_out: out_spectrum.stripe_score(params.stripe_bins()),
        }
    };

    let banding_part = |ref_luma: &PlaneF, out_luma: &PlaneF| BandingPart {
        runlen_rel: banding::runlen_delta(ref_luma, out_luma, params.banding_levels()),
        grad_rel: banding::gradient_delta(ref_luma, out_luma),
    };

    let color_part = || {
        let ref_lab = color::rgb_to_lab(reference);
        let out_lab = color::rgb_to_lab(output);
        ColorPart {
            chroma_delta_mean: colordiff::mean_chroma_delta(&ref_lab, &out_lab),
            delta_e00_mean: colordiff::mean_delta_e_2000(&ref_lab, &out_lab),
        }
    };

    let fidelity_part = |ref_luma: &PlaneF, out_luma: &PlaneF| FidelityPart {
        clip_ref: clipping::clip_rates(reference, params.clip_epsilon()),
        clip_out: clipping::clip_rates(output, params.clip_epsilon()),
        gmsd: fidelity::gmsd(ref_luma, out_luma),
        psnr_y: fidelity::psnr_luma(ref_luma, out_luma),
    };

    let perceptual_part = || {
        params
            .perceptual()
            .and_then(|plugin| perceptual::invoke(plugin, reference, output))
    };

    let (ms_ssim, spectral, bands, colors, fidelities, perceptual) = if params.parallel() {
        let ((ms, spec), ((band, col), (fid, lp))) = rayon::join(
            || {
                rayon::join(
                    || ssim::ms_ssim(&ref_luma, &out_luma),
                    || spectral_part(&ref_luma, &out_luma),
                )
            },
            || {
                rayon::join(
                    || rayon::join(|| banding_part(&ref_luma, &out_luma), color_part),
                    || rayon::join(|| fidelity_part(&ref_luma, &out_luma), perceptual_part),
                )
            },
        );
        (ms, spec, band, col, fid, lp)
    } else {
        (
            ssim::ms_ssim(&ref_luma, &out_luma),
            spectral_part(&ref_luma, &out_luma),
            banding_part(&ref_luma, &out_luma),
            color_part(),
            fidelity_part(&ref_luma, &out_luma),
            perceptual_part(),
        )
    };

    let clip_rel = fidelities.clip_out.delta(&fidelities.clip_ref);

    MetricsRecord {
        ms_ssim,
        hf_ratio_ref: spectral.hf_ratio_ref,
        hf_ratio_out: spectral.hf_ratio_out,
        hf_ratio_delta: spectral.hf_ratio_out - spectral.hf_ratio_ref,
        stripe_ref: spectral.stripe_ref,
        stripe_out: spectral.stripe_out,
        stripe_rel: spectral.stripe_out - spectral.stripe_ref,
        banding_runlen_rel: bands.runlen_rel,
        banding_grad_rel: bands.grad_rel,
        clip_luma_ref: fidelities.clip_ref.luma,
        clip_r_ref: fidelities.clip_ref.r,
        clip_g_ref: fidelities.clip_ref.g,
        clip_b_ref: fidelities.clip_ref.b,
        clip_luma_out: fidelities.clip_out.luma,
        clip_r_out: fidelities.clip_out.r,
        clip_g_out: fidelities.clip_out.g,
        clip_b_out: fidelities.clip_out.b,
        clip_luma_rel: clip_rel.luma,
        clip_r_rel: clip_rel.r,
        clip_g_rel: clip_rel.g,
        clip_b_rel: clip_rel.b,
        chroma_delta_mean: colors.chroma_delta_mean,
        delta_e00_mean: colors.delta_e00_mean,
        gmsd: fidelities.gmsd,
        psnr_y: fidelities.psnr_y,
        perceptual,
    }
}
