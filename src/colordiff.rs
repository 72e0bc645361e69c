//! Color-difference metrics in CIELAB: mean chroma loss and CIEDE2000.

use crate::color::chroma;
use crate::image::LabImage;

/// Mean absolute chroma difference between two Lab images.
///
/// # Panics
/// Panics if the images differ in shape.
#[must_use]
pub fn mean_chroma_delta(reference: &LabImage, output: &LabImage) -> f64 {
    assert!(reference.a.same_size(&output.a));
    let ref_chroma = chroma(reference);
    let out_chroma = chroma(output);
    let n = ref_chroma.data().len();
    let sum: f64 = ref_chroma
        .data()
        .iter()
        .zip(out_chroma.data().iter())
        .map(|(&r, &o)| f64::from((o - r).abs()))
        .sum();
    sum / n as f64
}

/// CIEDE2000 color difference between two Lab colors (`kL = kC = kH = 1`).
///
/// Implements the full formula: the G chroma rotation with
/// `C_avg^7 / (C_avg^7 + 25^7)`, the T hue weighting, the S_L/S_C/S_H
/// compensation terms, and the R_T rotation with the 275-degree hue Gaussian.
#[must_use]
pub fn delta_e_2000(lab1: [f64; 3], lab2: [f64; 3]) -> f64 {
    const POW25_7: f64 = 6103515625.0; // 25^7

    let (l1, a1, b1) = (lab1[0], lab1[1], lab1[2]);
    let (l2, a2, b2) = (lab2[0], lab2[1], lab2[2]);

    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let c_avg = (c1 + c2) / 2.0;

    let c_avg_pow7 = c_avg.powi(7);
    let g = 0.5 * (1.0 - (c_avg_pow7 / (c_avg_pow7 + POW25_7)).sqrt());

    let a1_prime = a1 * (1.0 + g);
    let a2_prime = a2 * (1.0 + g);

    let c1_prime = (a1_prime * a1_prime + b1 * b1).sqrt();
    let c2_prime = (a2_prime * a2_prime + b2 * b2).sqrt();
    let c_avg_prime = (c1_prime + c2_prime) / 2.0;

    let h1_prime = hue_angle(a1_prime, b1);
    let h2_prime = hue_angle(a2_prime, b2);

    let delta_h_prime = if c1_prime * c2_prime == 0.0 {
        0.0
    } else {
        let diff = h2_prime - h1_prime;
        if diff.abs() <= 180.0 {
            diff
        } else if diff > 180.0 {
            diff - 360.0
        } else {
            diff + 360.0
        }
    };

    let delta_h_big =
        2.0 * (c1_prime * c2_prime).sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    let h_avg_prime = if c1_prime * c2_prime == 0.0 {
        h1_prime + h2_prime
    } else {
        let diff = (h1_prime - h2_prime).abs();
        let sum = h1_prime + h2_prime;
        if diff <= 180.0 {
            sum / 2.0
        } else if sum < 360.0 {
            (sum + 360.0) / 2.0
        } else {
            (sum - 360.0) / 2.0
        }
    };

    let t = 1.0 - 0.17 * (h_avg_prime - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_avg_prime).to_radians().cos()
        + 0.32 * (3.0 * h_avg_prime + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_avg_prime - 63.0).to_radians().cos();

    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;
    let l_avg_prime = (l1 + l2) / 2.0;

    let l_shift = (l_avg_prime - 50.0) * (l_avg_prime - 50.0);
    let s_l = 1.0 + (0.015 * l_shift) / (20.0 + l_shift).sqrt();
    let s_c = 1.0 + 0.045 * c_avg_prime;
    let s_h = 1.0 + 0.015 * c_avg_prime * t;

    let delta_theta = 30.0 * (-((h_avg_prime - 275.0) / 25.0).powi(2)).exp();
    let c_avg_prime_pow7 = c_avg_prime.powi(7);
    let r_c = 2.0 * (c_avg_prime_pow7 / (c_avg_prime_pow7 + POW25_7)).sqrt();
    let r_t = -r_c * (2.0 * delta_theta.to_radians()).sin();

    let term_l = delta_l_prime / s_l;
    let term_c = delta_c_prime / s_c;
    let term_h = delta_h_big / s_h;

    (term_l * term_l + term_c * term_c + term_h * term_h + r_t * term_c * term_h).sqrt()
}

/// Hue angle in degrees, in [0, 360); 0 for achromatic samples.
#[inline]
fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let mut h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h += 360.0;
    }
    h
}

/// Mean CIEDE2000 distance over all pixels of two Lab images.
///
/// # Panics
/// Panics if the images differ in shape.
#[must_use]
pub fn mean_delta_e_2000(reference: &LabImage, output: &LabImage) -> f64 {
    assert!(reference.l.same_size(&output.l));
    let n = reference.l.data().len();
    let mut sum = 0.0f64;
    for i in 0..n {
        let lab1 = [
            f64::from(reference.l.data()[i]),
            f64::from(reference.a.data()[i]),
            f64::from(reference.b.data()[i]),
        ];
        let lab2 = [
            f64::from(output.l.data()[i]),
            f64::from(output.a.data()[i]),
            f64::from(output.b.data()[i]),
        ];
        sum += delta_e_2000(lab1, lab2);
    }
    sum / n as f64
}
