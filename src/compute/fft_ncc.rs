//! Single-channel FFT-based normalised cross-correlation kernel.

use crate::compute::running_moments::{initial_moments, update_moments};
use crate::compute::workspace::{NccPlans, NccWorkspace};
use crate::error::NccError;
use crate::shapes::NccShape;

/// Variance floor below which a column's correlation is reported as zero
/// rather than dividing by a near-zero standard deviation.
pub const VARIANCE_FLOOR: f64 = 1e-7;

/// Compute NCC of `n_templates` templates against one image, for one channel.
///
/// `templates` is `n_templates * template_len`, row-major. `image` is
/// `image_len`. `output` is `n_templates * steps`, row-major, where
/// `steps = image_len - template_len + 1`.
pub fn fft_ncc_single(
    templates: &[f32],
    image: &[f32],
    shape: &NccShape,
    workspace: &mut NccWorkspace,
    plans: &NccPlans,
    output: &mut [f32],
) -> Result<(), NccError> {
    let n_templates = shape.n_templates;
    let template_len = shape.template_len;
    let steps = shape.steps();
    if n_templates == 0 || steps == 0 {
        return Ok(());
    }

    let transform_len = shape.transform_len;
    let spectrum_len = shape.spectrum_len();

    workspace.clear_inputs();

    // Phase 1: time-reverse each template row into template_ext, track the
    // raw (not mean-subtracted) sum — this term does not vanish for
    // templates with a small residual non-zero mean, so it is preserved
    // exactly rather than assumed to be zero.
    let mut norm_sums = vec![0.0f64; n_templates];
    for k in 0..n_templates {
        let t_row = &templates[k * template_len..(k + 1) * template_len];
        let mut sum = 0.0f64;
        let ext_row = k * transform_len;
        for p in 0..template_len {
            workspace.template_ext[ext_row + template_len - 1 - p] = t_row[p];
            sum += t_row[p] as f64;
        }
        norm_sums[k] = sum;
    }

    workspace.image_ext[..image.len()].copy_from_slice(image);

    // Phase 2: transform, pointwise multiply, inverse transform.
    workspace.forward_image(plans)?;
    for k in 0..n_templates {
        workspace.forward_template_row(plans, k, transform_len, spectrum_len)?;
        let s_row = k * spectrum_len;
        for i in 0..spectrum_len {
            workspace.out[s_row + i] = workspace.outa[s_row + i] * workspace.outb[i];
        }
        workspace.inverse_row(plans, k, transform_len, spectrum_len)?;
    }

    // Phase 3: normalise with a running mean/variance over the image.
    //
    // Each row's forward/inverse transform above is an independent 1D
    // real-FFT call (no native N-way batching — see DESIGN.md), so the
    // unnormalised round trip scales by `transform_len` alone, not by
    // `transform_len * n_templates`: that extra factor only applies to a
    // genuine 2D `(n_templates, transform_len)` transform, which this
    // workspace never performs.
    let scale = transform_len as f64;
    let (mut mean, mut var) = initial_moments(image, template_len);

    for k in 0..n_templates {
        let ccc_row = k * transform_len;
        let raw = workspace.ccc[ccc_row + template_len - 1] as f64;
        output[k * steps] = normalise_sample(raw, scale, norm_sums[k], mean, var);
    }

    for j in 1..steps {
        let x_in = image[j + template_len - 1] as f64;
        let x_out = image[j - 1] as f64;
        let (new_mean, new_var) = update_moments(mean, var, x_in, x_out, template_len as f64);
        mean = new_mean;
        var = new_var;

        for k in 0..n_templates {
            let ccc_row = k * transform_len;
            let raw = workspace.ccc[ccc_row + template_len - 1 + j] as f64;
            output[k * steps + j] = normalise_sample(raw, scale, norm_sums[k], mean, var);
        }
    }

    Ok(())
}

#[inline]
fn normalise_sample(raw: f64, scale: f64, norm_sum: f64, mean: f64, var: f64) -> f32 {
    if var < VARIANCE_FLOOR {
        0.0
    } else {
        ((raw / scale - norm_sum * mean) / var.sqrt()) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::workspace::{NccPlans, NccWorkspace};
    use proptest::prelude::*;

    fn run(
        templates: &[f32],
        template_len: usize,
        n_templates: usize,
        image: &[f32],
        transform_len: usize,
    ) -> Vec<f32> {
        let shape =
            NccShape::validate(1, n_templates, template_len, image.len(), transform_len).unwrap();
        let plans = NccPlans::new(transform_len);
        let mut ws = NccWorkspace::allocate(&shape, &plans).unwrap();
        let mut output = vec![0.0f32; n_templates * shape.steps()];
        fft_ncc_single(templates, image, &shape, &mut ws, &plans, &mut output).unwrap();
        output
    }

    #[test]
    fn test_flat_image_is_all_zero() {
        let template = [0.0f32, 0.0, 1.0, 0.0];
        let image = vec![3.14f32; 16];
        let output = run(&template, 4, 1, &image, 32);
        assert!(output.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_impulse_against_impulse_peaks_at_alignment() {
        let template = [0.0f32, 0.0, 1.0, 0.0];
        let mut image = vec![0.0f32; 16];
        image[10] = 1.0;
        let output = run(&template, 4, 1, &image, 32);

        // Template's "1" sits at offset 2 of a length-4 window; it aligns
        // with image[10] when the window starts at j = 8.
        let peak_j = output
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.abs().partial_cmp(&b.abs()).unwrap())
            .map(|(j, _)| j)
            .unwrap();
        assert_eq!(peak_j, 8);
        assert!(output[8] > 0.0, "peak should be positive, got {}", output[8]);
        // Windows that do not overlap the impulse sit over a constant-zero
        // image segment and hit the variance floor exactly.
        for j in [0usize, 1, 2, 3, 4, 5, 11, 12] {
            assert_eq!(output[j], 0.0, "j={j} should be flat-window zero");
        }
    }

    #[test]
    fn test_self_match_reaches_unity() {
        // This kernel's literal phase-3 formula divides only by the image
        // window's standard deviation, not by a separate template-norm term
        // (see the running-moments module docs and DESIGN.md); reaching
        // exactly 1.0 on self-match therefore requires sum(t^2) == 1/L_t,
        // not the generic Euclidean unit norm sum(t^2) == 1.
        let template_len = 4usize;
        let shape_vec = [1.0f32, -1.0, 1.0, -1.0]; // zero-mean
        let raw_energy: f32 = shape_vec.iter().map(|&v| v * v).sum();
        let scale = (1.0 / (template_len as f32 * raw_energy)).sqrt();
        let template: Vec<f32> = shape_vec.iter().map(|&v| v * scale).collect();

        let mut image = vec![0.0f32; 16];
        image[..template_len].copy_from_slice(&template);
        let output = run(&template, template_len, 1, &image, 32);
        assert!((output[0] - 1.0).abs() < 1e-3, "got {}", output[0]);
    }

    #[test]
    fn test_oracle_agreement_with_multiple_templates() {
        // Regression test for the per-row transform scale: with more than
        // one template, each row is still an independent 1D real-FFT call
        // (not a batched 2D transform), so the unnormalised round-trip
        // scales by `transform_len` alone. Dividing by `transform_len *
        // n_templates` instead silently shrinks every trace by a factor of
        // `n_templates` and breaks agreement with the time-domain oracle.
        let template_len = 6usize;
        let image_len = 48usize;
        let transform_len = 64usize;
        let n_templates = 3usize;

        let mut templates = Vec::with_capacity(n_templates * template_len);
        for k in 0..n_templates {
            let raw: Vec<f32> = (0..template_len)
                .map(|p| ((k * 5 + p * 11) as f32 * 0.083).sin())
                .collect();
            let mean: f32 = raw.iter().sum::<f32>() / template_len as f32;
            templates.extend(raw.iter().map(|&v| v - mean));
        }
        let image: Vec<f32> = (0..image_len).map(|i| (i as f32 * 0.029).cos() * 2.3).collect();

        let fft_output = run(&templates, template_len, n_templates, &image, transform_len);

        let steps = image_len - template_len + 1;
        let mut time_output = vec![0.0f32; n_templates * steps];
        crate::compute::time_ncc::time_ncc_multi(
            &templates,
            template_len,
            n_templates,
            &image,
            &mut time_output,
        );

        for (k, (a, b)) in fft_output.iter().zip(time_output.iter()).enumerate() {
            assert!((a - b).abs() < 1e-4, "sample {k}: fft={a} time={b}");
        }
    }

    proptest! {
        // P4 (flat window): a constant image hits the variance floor at
        // every output index, regardless of the template.
        #[test]
        fn p4_flat_image_is_always_zero(
            raw_template in prop::collection::vec(-3.0f32..3.0, 2..8),
            constant in -10.0f32..10.0,
        ) {
            let mean: f32 = raw_template.iter().sum::<f32>() / raw_template.len() as f32;
            let template: Vec<f32> = raw_template.iter().map(|&v| v - mean).collect();
            let template_len = template.len();
            let image_len = template_len * 3;
            let transform_len = (template_len + image_len - 1).next_power_of_two();
            let image = vec![constant; image_len];

            let output = run(&template, template_len, 1, &image, transform_len);
            prop_assert!(output.iter().all(|&v| v == 0.0));
        }
    }
}
