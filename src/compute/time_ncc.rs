//! Time-domain (direct-sum) normalised cross-correlation.
//!
//! Used as an oracle in tests and as the small-input fallback; not the
//! performance path. Unlike the FFT kernel, this recomputes the numerator
//! and the image window's sum of squared deviations from scratch at every
//! output index — only the running mean is carried forward — trading
//! `O(steps * template_len)` work for a denominator that needs no caller
//! precondition on template scaling.

/// Correlate one template against one image, `y[j]` for `j` in `[0, steps)`.
pub fn time_ncc(template: &[f32], image: &[f32]) -> Vec<f32> {
    let template_len = template.len();
    let image_len = image.len();
    let steps = image_len - template_len + 1;
    let mut output = vec![0.0f32; steps];
    time_ncc_into(template, image, &mut output);
    output
}

/// Same as [`time_ncc`], writing into a pre-allocated `output` slice of
/// length `steps`.
pub fn time_ncc_into(template: &[f32], image: &[f32], output: &mut [f32]) {
    let template_len = template.len();
    let image_len = image.len();
    let steps = image_len - template_len + 1;
    if steps == 0 {
        return;
    }

    let auto_a: f64 = template.iter().map(|&t| (t as f64) * (t as f64)).sum();

    let mut mean: f64 = image[..template_len].iter().map(|&v| v as f64).sum::<f64>()
        / template_len as f64;

    let mut numerator = 0.0f64;
    let mut auto_b = 0.0f64;
    for p in 0..template_len {
        let dev = image[p] as f64 - mean;
        numerator += template[p] as f64 * dev;
        auto_b += dev * dev;
    }
    output[0] = (numerator / (auto_a * auto_b).sqrt()) as f32;

    for k in 1..steps {
        mean += (image[k + template_len - 1] as f64 - image[k - 1] as f64) / template_len as f64;

        numerator = 0.0;
        auto_b = 0.0;
        for p in 0..template_len {
            let dev = image[p + k] as f64 - mean;
            numerator += template[p] as f64 * dev;
            auto_b += dev * dev;
        }
        output[k] = (numerator / (auto_a * auto_b).sqrt()) as f32;
    }
}

/// Correlate `n_templates` templates (each `template_len` long, row-major)
/// against one image. No masking, padding, or cross-channel accumulation —
/// this is the oracle entry point, not part of the production pipeline.
pub fn time_ncc_multi(
    templates: &[f32],
    template_len: usize,
    n_templates: usize,
    image: &[f32],
    output: &mut [f32],
) {
    let image_len = image.len();
    let steps = image_len - template_len + 1;
    for k in 0..n_templates {
        let t_row = &templates[k * template_len..(k + 1) * template_len];
        let out_row = &mut output[k * steps..(k + 1) * steps];
        time_ncc_into(t_row, image, out_row);
    }
}
