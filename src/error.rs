//! Error types for the NCC kernel.

/// Errors produced by the NCC entry points.
///
/// Each variant corresponds to one of the status codes returned across the
/// `extern "C"` boundary: see [`crate::ffi`] for the mapping.
#[derive(Debug, thiserror::Error)]
pub enum NccError {
    #[error("workspace allocation failed for {context}")]
    AllocationFailed { context: &'static str },

    #[error(
        "normalisation overflow: {overflow_count} sample(s) across the call exceeded |y| > 1.01"
    )]
    NormalisationFailed { overflow_count: usize },

    #[error("invalid shape: {reason}")]
    InvalidShape { reason: String },
}

pub type NccResult<T> = Result<T, NccError>;
