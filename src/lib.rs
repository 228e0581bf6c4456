//! Lossless Huffman compression for text.
//!
//! Compression runs the stages in order: frequency analysis, tree
//! construction, code derivation, bit packing and container framing.
//! Decompression rebuilds the tree from the frequency table stored in the
//! container header and decodes the payload back into the original text.
//!
//! ```
//! let packed = hz::compress("abracadabra").unwrap();
//! assert_eq!(hz::decompress(&packed).unwrap(), "abracadabra");
//! ```

pub mod bitstream;
pub mod codec;
pub mod container;
pub mod frequency;
pub mod huffman;
pub mod pack;
pub mod pqueue;

#[cfg(test)]
mod validation;

pub use codec::{
    compress, compress_with_options, decompress, inspect, CompressOptions, Compressed,
    CompressionStats, ContainerInfo,
};

use thiserror::Error;

/// Error types for hz operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HzError {
    /// Input is empty or cannot be analyzed.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A symbol has no entry in the code table.
    #[error("symbol {symbol:?} has no code")]
    MissingCode { symbol: char },
    /// The container header is missing, truncated or malformed.
    #[error("corrupt header: {reason}")]
    CorruptHeader { reason: String },
    /// The payload is shorter than the header implies.
    #[error("truncated payload: expected {expected} bytes, found {actual}")]
    TruncatedPayload { expected: usize, actual: usize },
    /// The payload bits do not resolve to the recorded symbols.
    #[error("decode error at bit {bit_offset}: {reason}")]
    DecodeError { bit_offset: usize, reason: String },
    /// An internal invariant was broken. This is a bug, not bad input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl HzError {
    pub(crate) fn corrupt_header(reason: impl Into<String>) -> Self {
        Self::CorruptHeader {
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(bit_offset: usize, reason: impl Into<String>) -> Self {
        Self::DecodeError {
            bit_offset,
            reason: reason.into(),
        }
    }

    /// Name of the stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "analysis",
            Self::MissingCode { .. } => "encode",
            Self::CorruptHeader { .. } => "header",
            Self::TruncatedPayload { .. } => "payload",
            Self::DecodeError { .. } => "decode",
            Self::InvariantViolation(_) => "internal",
        }
    }

    /// True for defects in this crate rather than problems with the input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

pub type HzResult<T> = Result<T, HzError>;
