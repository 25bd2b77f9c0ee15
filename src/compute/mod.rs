//! Compute module — the frequency-domain and time-domain NCC kernels, the
//! multi-channel orchestrator that drives them, and their shared scratch
//! workspace.

mod fft_ncc;
mod orchestrator;
mod postprocess;
mod running_moments;
pub mod time_ncc;
pub mod workspace;

pub use fft_ncc::{fft_ncc_single, VARIANCE_FLOOR};
pub use orchestrator::fft_ncc_multi;
pub use postprocess::{apply_mask, apply_pad_shift, mask_and_sanitize, sanitize};
pub use time_ncc::{time_ncc, time_ncc_multi};
