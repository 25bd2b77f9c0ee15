//! `extern "C"` entry points.
//!
//! Each function here is a thin boundary: it reconstructs slices from raw
//! pointers, validates them, delegates to the safe internal implementation,
//! and collapses the resulting `Result` into the integer status codes from
//! the error-handling design (`0` success, `>0` allocation/inner-kernel
//! failure, `-1` normalisation overflow). The safe functions it calls are
//! themselves public — callers linking the crate directly as a Rust
//! dependency should prefer [`crate::fft_ncc_multi`] /
//! [`crate::fft_ncc_single`] / [`crate::time_ncc_multi`] over this boundary.

use std::slice;

use crate::compute::{fft_ncc_multi as fft_ncc_multi_safe, fft_ncc_single as fft_ncc_single_safe};
use crate::compute::time_ncc::time_ncc_multi as time_ncc_multi_safe;
use crate::error::NccError;
use crate::shapes::NccShape;

fn status_of(result: Result<(), NccError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(NccError::NormalisationFailed { .. }) => -1,
        Err(err) => {
            log::error!("ncc-kernel call failed: {err}");
            1
        }
    }
}

/// C ABI: run the full multi-channel pipeline (FFT NCC, mask/sanitise,
/// pad shift, channel reduction).
///
/// # Safety
///
/// Every pointer must be non-null and point to at least the number of
/// elements implied by the accompanying dimensions, for the lifetime of the
/// call. `ncc` must be writable for `n_channels * n_templates * (image_len -
/// template_len + 1)` elements. `used_chans` and `pad` must each have
/// `n_channels * n_templates` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fft_ncc_multi(
    templates: *const f32,
    n_templates: usize,
    template_len: usize,
    n_channels: usize,
    image: *const f32,
    image_len: usize,
    ncc: *mut f32,
    transform_len: usize,
    used_chans: *const i32,
    pad: *const i32,
) -> i32 {
    let shape = match NccShape::validate(n_channels, n_templates, template_len, image_len, transform_len) {
        Ok(shape) => shape,
        Err(err) => {
            log::error!("fft_ncc_multi: {err}");
            return 1;
        }
    };

    let steps = shape.steps();
    let templates = unsafe { slice::from_raw_parts(templates, n_channels * n_templates * template_len) };
    let image = unsafe { slice::from_raw_parts(image, n_channels * image_len) };
    let used_chans_raw = unsafe { slice::from_raw_parts(used_chans, n_channels * n_templates) };
    let pad_raw = unsafe { slice::from_raw_parts(pad, n_channels * n_templates) };
    let ncc = unsafe { slice::from_raw_parts_mut(ncc, n_channels * n_templates * steps) };

    let used_chans: Vec<bool> = used_chans_raw.iter().map(|&v| v != 0).collect();
    let pad: Vec<usize> = pad_raw.iter().map(|&v| v.max(0) as usize).collect();

    status_of(fft_ncc_multi_safe(templates, image, &shape, &used_chans, &pad, ncc))
}

/// C ABI: run the FFT NCC kernel for a single channel, with no masking,
/// padding, or accumulation.
///
/// # Safety
///
/// Same pointer-liveness requirements as [`fft_ncc_multi`], minus the
/// `n_channels` axis: `templates` has `n_templates * template_len`
/// elements, `image` has `image_len`, `ncc` is writable for `n_templates *
/// (image_len - template_len + 1)` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fft_ncc_single(
    templates: *const f32,
    n_templates: usize,
    template_len: usize,
    image: *const f32,
    image_len: usize,
    ncc: *mut f32,
    transform_len: usize,
) -> i32 {
    let shape = match NccShape::validate(1, n_templates, template_len, image_len, transform_len) {
        Ok(shape) => shape,
        Err(err) => {
            log::error!("fft_ncc_single: {err}");
            return 1;
        }
    };

    let steps = shape.steps();
    let templates = unsafe { slice::from_raw_parts(templates, n_templates * template_len) };
    let image = unsafe { slice::from_raw_parts(image, image_len) };
    let ncc = unsafe { slice::from_raw_parts_mut(ncc, n_templates * steps) };

    let plans = crate::compute::workspace::NccPlans::new(shape.transform_len);
    let result = crate::compute::workspace::NccWorkspace::allocate(&shape, &plans)
        .map_err(|e| {
            log::error!("fft_ncc_single: {e}");
            e
        })
        .and_then(|mut workspace| fft_ncc_single_safe(templates, image, &shape, &mut workspace, &plans, ncc));

    status_of(result)
}

/// C ABI: time-domain oracle over `n_templates` templates vs one image. No
/// masking, padding, or cross-channel accumulation — the direct correlate of
/// [`crate::time_ncc_multi`].
///
/// # Safety
///
/// `templates` has `n_templates * template_len` elements, `image` has
/// `image_len`, `ncc` is writable for `n_templates * (image_len -
/// template_len + 1)` elements. This entry point has no status to report
/// beyond shape validity: malformed shapes simply return `1` without
/// touching `ncc`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn time_ncc_multi(
    templates: *const f32,
    n_templates: usize,
    template_len: usize,
    image: *const f32,
    image_len: usize,
    ncc: *mut f32,
) -> i32 {
    if template_len == 0 || image_len < template_len {
        log::error!(
            "time_ncc_multi: invalid shape (template_len={template_len}, image_len={image_len})"
        );
        return 1;
    }

    let steps = image_len - template_len + 1;
    let templates = unsafe { slice::from_raw_parts(templates, n_templates * template_len) };
    let image = unsafe { slice::from_raw_parts(image, image_len) };
    let ncc = unsafe { slice::from_raw_parts_mut(ncc, n_templates * steps) };

    time_ncc_multi_safe(templates, template_len, n_templates, image, ncc);
    0
}
