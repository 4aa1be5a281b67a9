//! Error types for the array codec

use thiserror::Error;

use crate::codec::HEADER_LEN;

/// Codec errors
///
/// Every variant except [`CodecError::InvalidInput`] describes a payload that
/// failed validation during decode; see [`CodecError::is_malformed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload is shorter than the fixed header
    #[error("malformed payload: {len} bytes is shorter than the {HEADER_LEN}-byte header")]
    TruncatedHeader {
        /// Bytes available
        len: usize,
    },

    /// Element type tag outside the supported set
    #[error("malformed payload: unknown element type tag {0}")]
    UnknownElementType(i32),

    /// Declared body size disagrees with the dimensions
    #[error(
        "malformed payload: declared size {declared} but {width}x{height} elements of {element_size} bytes need {expected}"
    )]
    SizeMismatch {
        /// Width from the header
        width: u32,
        /// Height from the header
        height: u32,
        /// Per-element byte size of the declared type
        element_size: usize,
        /// Size field from the header
        declared: u64,
        /// Size derived from the dimensions
        expected: u64,
    },

    /// Dimensions multiply past the addressable range
    #[error("malformed payload: {width}x{height} elements of {element_size} bytes overflows")]
    DimensionOverflow {
        /// Width from the header
        width: u32,
        /// Height from the header
        height: u32,
        /// Per-element byte size of the declared type
        element_size: usize,
    },

    /// Body length differs from the declared size
    #[error("malformed payload: header declares {declared} body bytes, found {actual}")]
    BodyLength {
        /// Size field from the header
        declared: u64,
        /// Bytes following the header
        actual: usize,
    },

    /// Buffer length does not match the declared dimensions and type
    #[error("invalid input: buffer holds {actual} bytes, dimensions require {expected:?}")]
    InvalidInput {
        /// Required length, `None` when the dimensions overflow
        expected: Option<usize>,
        /// Actual buffer length
        actual: usize,
    },
}

impl CodecError {
    /// Whether this error came from validating an encoded payload
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::InvalidInput { .. })
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
