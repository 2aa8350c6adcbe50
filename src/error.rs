//! Error types for the edge-map pipeline and handle bridge.

use thiserror::Error;

use crate::bridge::RawHandle;

/// Errors reported by the pipeline and the handle bridge.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// Channel count outside {1, 3, 4}.
    #[error("unsupported channel count {channels}: expected 1 (gray), 3 (BGR) or 4 (RGBA)")]
    UnsupportedChannels {
        /// The rejected channel count.
        channels: usize,
    },

    /// Raw pixel buffer does not match the declared dimensions.
    #[error("pixel buffer holds {actual} bytes but {width}x{height}x{channels} needs {expected}")]
    BufferSize {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Declared channel count.
        channels: usize,
        /// Bytes required by the declared shape.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// Dimensions too large to report through the C ABI's `i32` queries.
    #[error("image dimensions {width}x{height} exceed {max}", max = i32::MAX)]
    DimensionOverflow {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
    },

    /// Array shape could not be built.
    #[error("invalid image shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A null handle was passed where a live image is required.
    #[error("null image handle")]
    NullHandle,

    /// The handle is not live: never minted by the bridge, or already released.
    #[error("image handle {0:#x} is not live (already released or never acquired)")]
    UnknownHandle(RawHandle),
}

/// Status code for a successful boundary call.
pub const STATUS_OK: i32 = 0;
/// Status code for a panic caught before it could cross the boundary.
pub const STATUS_PANIC: i32 = -99;

impl EdgeError {
    /// Creates a buffer size error for the declared shape.
    #[must_use]
    pub const fn buffer_size(width: usize, height: usize, channels: usize, actual: usize) -> Self {
        Self::BufferSize {
            width,
            height,
            channels,
            expected: width.saturating_mul(height).saturating_mul(channels),
            actual,
        }
    }

    /// Negative status code used by the C ABI.
    #[must_use]
    pub const fn status_code(&self) -> i32 {
        match self {
            Self::NullHandle => -1,
            Self::UnknownHandle(_) => -2,
            Self::UnsupportedChannels { .. } => -3,
            Self::BufferSize { .. } => -4,
            Self::Shape(_) => -5,
            Self::DimensionOverflow { .. } => -6,
        }
    }

    /// Returns true for errors caused by handle misuse rather than pixel data.
    #[must_use]
    pub const fn is_handle_error(&self) -> bool {
        matches!(self, Self::NullHandle | Self::UnknownHandle(_))
    }
}

/// Result type for edge-map operations.
pub type Result<T> = std::result::Result<T, EdgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct_and_negative() {
        let errors = [
            EdgeError::NullHandle,
            EdgeError::UnknownHandle(0x10),
            EdgeError::UnsupportedChannels { channels: 2 },
            EdgeError::buffer_size(2, 2, 4, 3),
            EdgeError::Shape(ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape)),
            EdgeError::DimensionOverflow { width: 1 << 31, height: 0 },
        ];
        let codes: Vec<i32> = errors.iter().map(EdgeError::status_code).collect();
        for (i, code) in codes.iter().enumerate() {
            assert!(*code < 0);
            assert_ne!(*code, STATUS_PANIC);
            assert!(!codes[i + 1..].contains(code), "duplicate code {code}");
        }
    }

    #[test]
    fn test_buffer_size_message() {
        let err = EdgeError::buffer_size(4, 3, 4, 10);
        assert_eq!(
            err.to_string(),
            "pixel buffer holds 10 bytes but 4x3x4 needs 48"
        );
        assert!(!err.is_handle_error());
    }

    #[test]
    fn test_shape_error_converts() {
        let err: EdgeError = ndarray::ShapeError::from_kind(ndarray::ErrorKind::OutOfBounds).into();
        assert_eq!(err.status_code(), -5);
        assert!(err.to_string().starts_with("invalid image shape"));
    }

    #[test]
    fn test_dimension_overflow_message() {
        let err = EdgeError::DimensionOverflow { width: 3_000_000_000, height: 0 };
        assert_eq!(err.to_string(), "image dimensions 3000000000x0 exceed 2147483647");
    }

    #[test]
    fn test_unknown_handle_message_is_hex() {
        let err = EdgeError::UnknownHandle(255);
        assert!(err.to_string().contains("0xff"));
        assert!(err.is_handle_error());
    }
}
