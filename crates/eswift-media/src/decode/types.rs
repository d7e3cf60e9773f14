//! Core types for image decoding.

use std::path::PathBuf;

use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be read (missing, permissions, ...).
    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is a vector image; the normalizer only handles rasters.
    #[error("vector image {path} cannot be cropped or resized")]
    VectorFormat { path: PathBuf },

    /// The file format is not recognized or not enabled in this build.
    #[error("unsupported image format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// The image file is corrupted or incomplete.
    #[error("corrupted or incomplete image {path}: {reason}")]
    CorruptedFile { path: PathBuf, reason: String },

    /// The image decoded to zero pixels.
    #[error("image {path} has no pixels")]
    EmptyImage { path: PathBuf },
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// Apply this orientation to a decoded image.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::FlipHorizontal => img.fliph(),
            Orientation::Rotate180 => img.rotate180(),
            Orientation::FlipVertical => img.flipv(),
            Orientation::Transpose => img.rotate90().fliph(),
            Orientation::Rotate90CW => img.rotate90(),
            Orientation::Transverse => img.rotate270().fliph(),
            Orientation::Rotate270CW => img.rotate270(),
        }
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded raster image together with the container it came from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Pixel data, already oriented when auto-orientation was requested.
    pub image: DynamicImage,
    /// Container format of the source file; output is written in the same one.
    pub format: ImageFormat,
    /// Orientation that was applied to `image` while decoding.
    pub applied_orientation: Orientation,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, format: ImageFormat) -> Self {
        Self {
            image,
            format,
            applied_orientation: Orientation::Normal,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn is_square(&self) -> bool {
        self.width() == self.height()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        assert!(!Orientation::Normal.swaps_dimensions());
        assert!(!Orientation::FlipHorizontal.swaps_dimensions());
        assert!(!Orientation::Rotate180.swaps_dimensions());
        assert!(!Orientation::FlipVertical.swaps_dimensions());

        assert!(Orientation::Transpose.swaps_dimensions());
        assert!(Orientation::Rotate90CW.swaps_dimensions());
        assert!(Orientation::Transverse.swaps_dimensions());
        assert!(Orientation::Rotate270CW.swaps_dimensions());
    }

    #[test]
    fn test_orientation_apply_matches_swap() {
        for value in 1..=8u32 {
            let orientation = Orientation::from(value);
            let out = orientation.apply(DynamicImage::new_rgb8(40, 30));
            if orientation.swaps_dimensions() {
                assert_eq!((out.width(), out.height()), (30, 40), "{orientation:?}");
            } else {
                assert_eq!((out.width(), out.height()), (40, 30), "{orientation:?}");
            }
        }
    }

    #[test]
    fn test_decoded_image_dimensions() {
        let img = DecodedImage::new(DynamicImage::new_rgb8(100, 50), ImageFormat::Png);

        assert_eq!(img.dimensions(), (100, 50));
        assert!(!img.is_square());
        assert!(!img.is_empty());
        assert_eq!(img.applied_orientation, Orientation::Normal);
    }

    #[test]
    fn test_decoded_image_empty() {
        let img = DecodedImage::new(DynamicImage::new_rgb8(0, 0), ImageFormat::Png);
        assert!(img.is_empty());
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::VectorFormat {
            path: PathBuf::from("media/plan.svg"),
        };
        assert_eq!(
            err.to_string(),
            "vector image media/plan.svg cannot be cropped or resized"
        );

        let err = DecodeError::UnsupportedFormat {
            path: PathBuf::from("a.bmp"),
            format: "Bmp".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported image format for a.bmp: Bmp");
    }
}
