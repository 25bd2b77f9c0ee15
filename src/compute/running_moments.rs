//! Running mean/variance over a sliding window, updated Welford-style.
//!
//! Kept in double precision regardless of the caller's sample type, to
//! contain drift over long images; callers convert to `f32` only when they
//! write a final output sample.

/// Mean and (biased, divisor = window length) variance of `x[0..window_len]`.
#[inline]
pub fn initial_moments(x: &[f32], window_len: usize) -> (f64, f64) {
    let n = window_len as f64;
    let mean: f64 = x[..window_len].iter().map(|&v| v as f64).sum::<f64>() / n;
    let var: f64 = x[..window_len]
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, var)
}

/// Slide the window forward by one sample: `x_out` leaves, `x_in` enters.
#[inline]
pub fn update_moments(mean: f64, var: f64, x_in: f64, x_out: f64, window_len: f64) -> (f64, f64) {
    let new_mean = mean + (x_in - x_out) / window_len;
    let new_var = var + (x_in - x_out) * (x_in - new_mean + x_out - mean) / window_len;
    (new_mean, new_var)
}
