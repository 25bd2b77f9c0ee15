//! Shape validation for NCC calls.
//!
//! All of the tensor-size invariants are checked once, at call entry, rather
//! than scattered as `assert!`s through the numerical code.

use crate::error::NccError;

/// Validated shape descriptor for one `fft_ncc_multi` / `fft_ncc_single` call.
#[derive(Debug, Clone, Copy)]
pub struct NccShape {
    pub n_channels: usize,
    pub n_templates: usize,
    pub template_len: usize,
    pub image_len: usize,
    pub transform_len: usize,
}

impl NccShape {
    /// Number of valid output samples per trace: `L_i - L_t + 1`.
    #[inline]
    pub fn steps(&self) -> usize {
        self.image_len - self.template_len + 1
    }

    /// `L_f / 2 + 1`, the length of a real-to-complex spectrum of size `L_f`.
    #[inline]
    pub fn spectrum_len(&self) -> usize {
        self.transform_len / 2 + 1
    }

    pub fn validate(
        n_channels: usize,
        n_templates: usize,
        template_len: usize,
        image_len: usize,
        transform_len: usize,
    ) -> Result<Self, NccError> {
        if template_len == 0 {
            return Err(NccError::InvalidShape {
                reason: "template_len must be at least 1".into(),
            });
        }
        if image_len < template_len {
            return Err(NccError::InvalidShape {
                reason: format!("image_len ({image_len}) must be >= template_len ({template_len})"),
            });
        }
        if transform_len < template_len + image_len - 1 {
            return Err(NccError::InvalidShape {
                reason: format!(
                    "transform_len ({transform_len}) must be >= template_len + image_len - 1 ({})",
                    template_len + image_len - 1
                ),
            });
        }
        if n_channels == 0 {
            return Err(NccError::InvalidShape {
                reason: "n_channels must be at least 1".into(),
            });
        }
        Ok(Self {
            n_channels,
            n_templates,
            template_len,
            image_len,
            transform_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_and_spectrum_len() {
        let shape = NccShape::validate(1, 3, 4, 16, 32).unwrap();
        assert_eq!(shape.steps(), 13);
        assert_eq!(shape.spectrum_len(), 17);
    }

    #[test]
    fn test_rejects_short_image() {
        let err = NccShape::validate(1, 1, 10, 4, 32).unwrap_err();
        assert!(matches!(err, NccError::InvalidShape { .. }));
    }

    #[test]
    fn test_rejects_undersized_transform() {
        let err = NccShape::validate(1, 1, 4, 16, 10).unwrap_err();
        assert!(matches!(err, NccError::InvalidShape { .. }));
    }

    #[test]
    fn test_rejects_zero_channels() {
        let err = NccShape::validate(0, 1, 4, 16, 32).unwrap_err();
        assert!(matches!(err, NccError::InvalidShape { .. }));
    }

    #[test]
    fn test_accepts_minimal_shape() {
        assert!(NccShape::validate(1, 0, 1, 1, 1).is_ok());
    }
}
