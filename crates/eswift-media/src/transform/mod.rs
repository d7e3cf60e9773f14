//! Pixel transformations applied by the normalizer: a centered square crop
//! followed by a bounded, shrink-only resize.
//!
//! # Coordinate System
//!
//! - Crop regions are in pixels, origin is the top-left corner
//! - Odd margins are floored (the extra pixel goes to the bottom/right)

mod crop;
mod resize;

pub use crop::{apply_square_crop, centered_square, crop_to_square, CropRegion};
pub use resize::{fit_dimensions, resize_to_fit, FilterType};
