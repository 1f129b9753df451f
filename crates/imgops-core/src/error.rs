//! Runtime errors for the imgops core.
//!
//! Only conditions that depend on external data are reported here:
//! decoding source images, constructing buffers from foreign storage,
//! and validating operation configs loaded at runtime. Programmer-error
//! preconditions (mismatched extents, even kernel lengths, reductions
//! over empty buffers) fail fast with `assert!` instead.

/// Errors that can occur at the runtime boundary of the core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Storage length does not match `height * width`.
    #[error("buffer storage holds {actual} elements, expected {expected}")]
    ExtentMismatch {
        /// `height * width` of the requested buffer.
        expected: usize,
        /// Length of the provided storage.
        actual: usize,
    },

    /// An operation config holds values the operation cannot run with.
    #[error("invalid operation configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_display() {
        assert_eq!(Error::EmptyInput.to_string(), "input image data is empty");
    }

    #[test]
    fn extent_mismatch_display() {
        let err = Error::ExtentMismatch {
            expected: 12,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "buffer storage holds 10 elements, expected 12"
        );
    }

    #[test]
    fn invalid_config_display() {
        let err = Error::InvalidConfig("sigma_x must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid operation configuration: sigma_x must be positive",
        );
    }
}
