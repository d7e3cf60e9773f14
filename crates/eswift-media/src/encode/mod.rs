//! Image encoding pipeline.
//!
//! This module provides functionality for:
//! - Re-encoding a normalized image in the format it was loaded from
//! - Replacing the file on disk atomically (temp file + rename)

mod format;
mod write;

use std::path::PathBuf;

use thiserror::Error;

pub use format::encode_image;
pub use write::write_atomic;

/// Errors that can occur while encoding or persisting an image.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder rejected the image
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed { format: String, reason: String },

    /// Creating, writing, syncing or renaming the output file failed
    #[error("failed to write image to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
