//! Crate-level error type.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Everything that can make a normalization fail. All variants are fatal
/// for the save that triggered the normalization; nothing is retried.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The source file is missing, unreadable, or not a supported raster.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The result could not be encoded or written back.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A bounding box side was zero.
    #[error("invalid bounding box {width}x{height}: both sides must be non-zero")]
    InvalidBoundingBox { width: u32, height: u32 },
}

/// Result type alias for normalizer operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;
