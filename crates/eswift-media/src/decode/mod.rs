//! Image decoding pipeline.
//!
//! This module provides functionality for:
//! - Reading an image file and detecting its raster format from magic bytes
//! - Rejecting vector (SVG) uploads and formats this build cannot decode
//! - Applying EXIF orientation so crops follow the displayed axis
//!
//! All operations are synchronous and run on the calling thread.

mod load;
mod types;

pub use load::{decode_bytes, detect_format, get_orientation, is_supported, is_vector, load_image};
pub use types::{DecodeError, DecodedImage, Orientation};
