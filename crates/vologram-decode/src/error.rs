//! Decode errors.

use thiserror::Error;

/// Errors produced while decoding vologram geometry data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended before a field could be read.
    #[error("{what}: need {needed} bytes, only {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// A sub-block size is not a whole number of elements.
    #[error("{what}: block of {size} bytes is not a multiple of the {stride}-byte stride")]
    BadStride {
        what: &'static str,
        size: usize,
        stride: usize,
    },

    /// The header does not start with the `VOLS` magic.
    #[error("bad header magic {found:?}")]
    BadMagic { found: [u8; 4] },

    /// A header field holds a value outside its valid range.
    #[error("invalid header field {field}: {reason}")]
    InvalidHeader {
        field: &'static str,
        reason: String,
    },

    /// A per-element count disagrees with the vertex count.
    #[error("{what}: expected {expected} elements, found {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A triangle refers to a vertex that does not exist.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// A frame block carries a different frame number than its position.
    #[error("frame number {found} found where frame {expected} was expected")]
    FrameNumberMismatch { expected: u32, found: i32 },

    /// The sub-block sizes of a frame do not add up to its declared payload.
    #[error("frame {frame}: sub-blocks span {actual} bytes, payload declares {declared}")]
    PayloadMismatch {
        frame: u32,
        declared: usize,
        actual: usize,
    },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
