//! Parallel FFT-based normalised cross-correlation (NCC) kernel.
//!
//! This crate is the computational core of a seismological
//! template-matching pipeline: it searches a continuous, multi-channel
//! waveform (the *image*) for occurrences of a bank of short reference
//! waveforms (the *templates*), returning one correlation trace per
//! template, summed across channels.
//!
//! # Architecture
//!
//! - [`shapes`]: validated tensor-shape descriptor, checked once per call.
//! - [`compute`]: the FFT and time-domain NCC kernels, the per-worker
//!   transform workspace, and the multi-channel orchestrator that fans the
//!   FFT kernel out over channels and reduces the result.
//! - [`worker_pool`]: scoped thread-pool sizing for the channel fan-out.
//! - [`error`]: the crate's error enum.
//! - [`ffi`]: `extern "C"` entry points for non-Rust callers.
//!
//! # Example
//!
//! ```
//! use ncc_kernel::{fft_ncc_multi, NccShape};
//!
//! // One channel, one template, a short image.
//! let template = [1.0f32, -1.0, 1.0, -1.0]; // zero-mean
//! let mut image = vec![0.0f32; 16];
//! image[..4].copy_from_slice(&template);
//!
//! let shape = NccShape::validate(1, 1, 4, image.len(), 32).unwrap();
//! let mut output = vec![0.0f32; shape.steps()];
//! let used_chans = [true];
//! let pad = [0usize];
//!
//! fft_ncc_multi(&template, &image, &shape, &used_chans, &pad, &mut output).unwrap();
//! assert!((output[0] - 1.0).abs() < 1e-3);
//! ```

pub mod compute;
pub mod error;
pub mod ffi;
pub mod shapes;
pub mod worker_pool;

pub use compute::{fft_ncc_multi, fft_ncc_single, time_ncc, time_ncc_multi};
pub use error::{NccError, NccResult};
pub use shapes::NccShape;
