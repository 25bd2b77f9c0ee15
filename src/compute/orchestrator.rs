//! Multi-channel orchestration: fan out the FFT NCC kernel over channels in
//! parallel, post-process each trace, then reduce channels in place.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use crate::compute::fft_ncc::fft_ncc_single;
use crate::compute::postprocess::{apply_pad_shift, mask_and_sanitize};
use crate::compute::workspace::{NccPlans, NccWorkspace};
use crate::error::{NccError, NccResult};
use crate::shapes::NccShape;
use crate::worker_pool::build_scoped_pool;

/// Run the FFT NCC kernel across every channel, post-process each trace, and
/// reduce the channel axis in place into the first plane of `output`.
///
/// `templates` is `n_channels * n_templates * template_len`, row-major.
/// `image` is `n_channels * image_len`, row-major. `used_chans` and `pad`
/// are each `n_channels * n_templates`. `output` is
/// `n_channels * n_templates * steps`, row-major, on entry; on success only
/// the first channel plane carries meaning.
pub fn fft_ncc_multi(
    templates: &[f32],
    image: &[f32],
    shape: &NccShape,
    used_chans: &[bool],
    pad: &[usize],
    output: &mut [f32],
) -> NccResult<()> {
    let n_channels = shape.n_channels;
    let n_templates = shape.n_templates;
    let steps = shape.steps();
    let template_len = shape.template_len;
    let image_len = shape.image_len;

    if n_templates == 0 || steps == 0 {
        return Ok(());
    }

    let plans = NccPlans::new(shape.transform_len);
    let pool = build_scoped_pool(n_channels);
    let n_workers = pool.current_num_threads().max(1);

    let mut workspaces = Vec::with_capacity(n_workers);
    for _ in 0..n_workers {
        workspaces.push(Mutex::new(NccWorkspace::allocate(shape, &plans).map_err(
            |e| {
                log::error!("workspace allocation failed: {e}");
                e
            },
        )?));
    }

    let overflow_total = AtomicUsize::new(0);

    pool.install(|| -> NccResult<()> {
        // Pass 1: fan out the FFT kernel and mask+sanitise, per channel.
        (0..n_channels)
            .into_par_iter()
            .try_for_each(|c| -> NccResult<()> {
                let worker_idx = rayon::current_thread_index().unwrap_or(0) % workspaces.len();
                let mut ws = workspaces[worker_idx]
                    .lock()
                    .expect("workspace mutex poisoned");
                ws.clear_inputs();

                let templates_c =
                    &templates[c * n_templates * template_len..(c + 1) * n_templates * template_len];
                let image_c = &image[c * image_len..(c + 1) * image_len];
                let output_c = &mut output[c * n_templates * steps..(c + 1) * n_templates * steps];

                fft_ncc_single(templates_c, image_c, shape, &mut ws, &plans, output_c)?;

                let mut channel_overflow = 0usize;
                for k in 0..n_templates {
                    let trace = &mut output_c[k * steps..(k + 1) * steps];
                    let used = used_chans[c * n_templates + k];
                    let overflow = mask_and_sanitize(trace, used);
                    if overflow > 0 {
                        log::warn!(
                            "normalisation overflow: channel {c} template {k} ({overflow} samples)"
                        );
                    }
                    channel_overflow += overflow;
                }
                overflow_total.fetch_add(channel_overflow, Ordering::Relaxed);
                Ok(())
            })
    })?;

    let total_overflow = overflow_total.load(Ordering::Relaxed);
    if total_overflow > 0 {
        return Err(NccError::NormalisationFailed {
            overflow_count: total_overflow,
        });
    }

    // Pass 2: pad shift, only once every channel's sanitise pass has joined
    // (a post-barrier decision — see compute::postprocess docs).
    pool.install(|| {
        output
            .par_chunks_mut(n_templates * steps)
            .enumerate()
            .for_each(|(c, channel_out)| {
                for k in 0..n_templates {
                    let trace = &mut channel_out[k * steps..(k + 1) * steps];
                    let p = pad[c * n_templates + k];
                    apply_pad_shift(trace, p);
                }
            });
    });

    accumulate_channels(output, n_channels, n_templates, steps);

    Ok(())
}

/// In-place reduction across the channel axis: `output[0][k][j] += sum_{c>0} output[c][k][j]`.
fn accumulate_channels(output: &mut [f32], n_channels: usize, n_templates: usize, steps: usize) {
    if n_channels <= 1 {
        return;
    }
    let plane_len = n_templates * steps;
    let (first_plane, rest) = output.split_at_mut(plane_len);

    first_plane
        .par_chunks_mut(steps)
        .enumerate()
        .for_each(|(k, row)| {
            for c in 1..n_channels {
                let chan_row = &rest[(c - 1) * plane_len + k * steps..(c - 1) * plane_len + (k + 1) * steps];
                for j in 0..steps {
                    row[j] += chan_row[j];
                }
            }
        });
}
