//! Centered square cropping.
//!
//! The longer axis loses equal margins on both sides. When the difference
//! between width and height is odd, the offset is floored so the extra
//! pixel is removed from the bottom (portrait) or right (landscape) edge.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// A square region of an image, in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Compute the centered square crop for an image of the given dimensions.
///
/// Returns `None` when the image is already square (or empty), in which
/// case no crop is needed.
pub fn centered_square(width: u32, height: u32) -> Option<CropRegion> {
    if width == height || width == 0 || height == 0 {
        return None;
    }

    if height > width {
        // Portrait: keep full width, strip top and bottom
        Some(CropRegion {
            x: 0,
            y: (height - width) / 2,
            side: width,
        })
    } else {
        // Landscape: keep full height, strip left and right
        Some(CropRegion {
            x: (width - height) / 2,
            y: 0,
            side: height,
        })
    }
}

/// Copy the given square region out of `image`.
pub fn apply_square_crop(image: &DynamicImage, region: CropRegion) -> DynamicImage {
    image.crop_imm(region.x, region.y, region.side, region.side)
}

/// Crop `image` to its centered square, returning the region that was used.
///
/// Square images are returned unchanged with `None`.
pub fn crop_to_square(image: DynamicImage) -> (DynamicImage, Option<CropRegion>) {
    match centered_square(image.width(), image.height()) {
        Some(region) => (apply_square_crop(&image, region), Some(region)),
        None => (image, None),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
