//! Normalizer configuration.
//!
//! Configuration is immutable once built and passed explicitly, so that two
//! callers never share a mutable default bounding box.

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;
use crate::transform::FilterType;

/// Default side length for listing thumbnails.
pub const DEFAULT_THUMBNAIL_SIDE: u32 = 500;

/// Default lossy quality, matching the JPEG quality the listing site has always used.
pub const DEFAULT_QUALITY: u8 = 75;

/// Upper bound on the final image dimensions. Only used to shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Reject bounding boxes with a zero side.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(NormalizeError::InvalidBoundingBox {
                width: self.max_width,
                height: self.max_height,
            });
        }
        Ok(())
    }

    /// Side of the largest square that fits.
    pub fn square_side(&self) -> u32 {
        self.max_width.min(self.max_height)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::square(DEFAULT_THUMBNAIL_SIDE)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.max_width, self.max_height)
    }
}

/// Settings for a [`Normalizer`](crate::Normalizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Bounding box used by the post-save hook.
    pub bounding_box: BoundingBox,
    /// Resampling filter for the downscale step.
    pub filter: FilterType,
    /// Lossy output quality (1-100) for JPEG and WebP.
    #[serde(alias = "jpeg_quality")]
    pub quality: u8,
    /// Apply the EXIF orientation tag before cropping.
    pub auto_orient: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::default(),
            filter: FilterType::default(),
            quality: DEFAULT_QUALITY,
            auto_orient: true,
        }
    }
}

impl NormalizeConfig {
    /// Check the configuration; quality is clamped at encode time, so only
    /// the bounding box can be invalid.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        self.bounding_box.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounding_box() {
        let bbox = BoundingBox::default();
        assert_eq!(bbox, BoundingBox::new(500, 500));
        assert_eq!(bbox.to_string(), "500x500");
    }

    #[test]
    fn test_zero_bounding_box_invalid() {
        assert!(BoundingBox::new(0, 500).validate().is_err());
        assert!(BoundingBox::new(500, 0).validate().is_err());
        assert!(BoundingBox::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_square_side() {
        assert_eq!(BoundingBox::new(800, 300).square_side(), 300);
    }

    #[test]
    fn test_config_defaults() {
        let config = NormalizeConfig::default();
        assert_eq!(config.bounding_box, BoundingBox::square(500));
        assert_eq!(config.filter, FilterType::Lanczos3);
        assert_eq!(config.quality, 75);
        assert!(config.auto_orient);
    }

    #[test]
    fn test_config_partial_json() {
        let config: NormalizeConfig =
            serde_json::from_str(r#"{"filter": "bilinear", "quality": 90}"#).unwrap();

        assert_eq!(config.filter, FilterType::Bilinear);
        assert_eq!(config.quality, 90);
        assert_eq!(config.bounding_box, BoundingBox::default());
        assert!(config.auto_orient);
    }

    #[test]
    fn test_config_json_roundtrip_bounding_box() {
        let json = r#"{"bounding_box": {"max_width": 800, "max_height": 600}}"#;
        let config: NormalizeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bounding_box, BoundingBox::new(800, 600));
    }

    #[test]
    fn test_config_unknown_filter_rejected() {
        let result = serde_json::from_str::<NormalizeConfig>(r#"{"filter": "bicubic"}"#);
        assert!(result.is_err());
    }
}
