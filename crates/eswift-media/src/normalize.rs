//! The square thumbnail normalizer.
//!
//! A normalization loads the image at a path, crops it to its centered
//! square, shrinks it to fit a bounding box, and writes it back over the
//! same path in the same format. [`plan`] computes the same steps from the
//! dimensions alone, for dry runs.

use std::path::Path;

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::config::{BoundingBox, NormalizeConfig};
use crate::decode::{load_image, DecodedImage, Orientation};
use crate::encode::{encode_image, write_atomic};
use crate::error::Result;
use crate::lock::PathLocks;
use crate::transform::{centered_square, crop_to_square, fit_dimensions, resize_to_fit, CropRegion};

/// The steps a normalization will take for an image of given dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizePlan {
    /// Centered square crop, `None` when the image is already square.
    pub crop: Option<CropRegion>,
    /// Target dimensions of the downscale, `None` when the square already fits.
    pub resize: Option<(u32, u32)>,
}

impl NormalizePlan {
    /// True when neither a crop nor a resize is needed.
    pub fn is_noop(&self) -> bool {
        self.crop.is_none() && self.resize.is_none()
    }

    /// Dimensions of the result for a `width x height` input.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if let Some(dims) = self.resize {
            return dims;
        }
        match self.crop {
            Some(region) => (region.side, region.side),
            None => (width, height),
        }
    }
}

/// Compute the crop and resize steps for a `width x height` image.
pub fn plan(width: u32, height: u32, bounds: BoundingBox) -> NormalizePlan {
    let crop = centered_square(width, height);
    let (cropped_w, cropped_h) = match crop {
        Some(region) => (region.side, region.side),
        None => (width, height),
    };

    NormalizePlan {
        crop,
        resize: fit_dimensions(cropped_w, cropped_h, bounds),
    }
}

/// What a normalization did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Dimensions after EXIF orientation, before cropping.
    pub original: (u32, u32),
    /// Orientation applied while decoding.
    pub orientation: Orientation,
    pub plan: NormalizePlan,
    /// Dimensions of the stored result.
    pub output: (u32, u32),
    /// Whether the file on disk was replaced.
    pub written: bool,
}

/// A normalized image and the report of how it was produced.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub image: DecodedImage,
    pub report: NormalizeReport,
}

/// Result of looking at a file without modifying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub format: ImageFormat,
    /// Dimensions after EXIF orientation.
    pub dimensions: (u32, u32),
    pub orientation: Orientation,
    pub plan: NormalizePlan,
}

impl Inspection {
    /// Whether normalizing this file would rewrite it.
    pub fn needs_write(&self) -> bool {
        !self.plan.is_noop() || self.orientation != Orientation::Normal
    }
}

/// Crops and shrinks listing images in place.
///
/// A `Normalizer` is safe to share between threads; concurrent calls for
/// the same path are serialized, calls for different paths run in parallel.
#[derive(Debug, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
    locks: PathLocks,
}

impl Normalizer {
    /// Create a normalizer, rejecting invalid configuration.
    pub fn new(config: NormalizeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            locks: PathLocks::new(),
        })
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalize the file at `path` using the configured bounding box.
    pub fn normalize_default(&self, path: &Path) -> Result<Normalized> {
        self.normalize(path, self.config.bounding_box)
    }

    /// Normalize the file at `path` to fit `bounds`, replacing it on disk.
    ///
    /// The file is left untouched when it is already a square that fits and
    /// needs no orientation fix, so running this twice is a no-op the
    /// second time.
    ///
    /// # Errors
    ///
    /// [`NormalizeError::Decode`](crate::NormalizeError::Decode) when the file
    /// is missing or not a supported raster image,
    /// [`NormalizeError::Encode`](crate::NormalizeError::Encode) when the
    /// result cannot be written back. On a write failure the original file is
    /// still intact.
    ///
    /// Symlinks are followed: the file they point to is rewritten and the
    /// link itself is kept.
    pub fn normalize(&self, path: &Path, bounds: BoundingBox) -> Result<Normalized> {
        bounds.validate()?;

        // Load and write through the resolved path, so a symlinked upload
        // rewrites its target instead of replacing the link.
        let guard = self.locks.lock(path);
        let path = guard.path();

        let decoded = load_image(path, self.config.auto_orient)?;
        let normalized = self.normalize_image(decoded, bounds);

        if !normalized.report.written {
            tracing::debug!(path = %path.display(), "image already normalized");
            return Ok(normalized);
        }

        let bytes = encode_image(
            &normalized.image.image,
            normalized.image.format,
            self.config.quality,
        )?;
        write_atomic(path, &bytes)?;

        let report = &normalized.report;
        tracing::info!(
            path = %path.display(),
            from = ?report.original,
            to = ?report.output,
            bytes = bytes.len(),
            "normalized image"
        );

        Ok(normalized)
    }

    /// Apply the crop and resize steps to an already decoded image.
    ///
    /// `report.written` tells whether the pixels differ from the stored
    /// file; this method itself never touches the filesystem.
    pub fn normalize_image(&self, decoded: DecodedImage, bounds: BoundingBox) -> Normalized {
        let original = decoded.dimensions();
        let orientation = decoded.applied_orientation;

        let (image, crop) = crop_to_square(decoded.image);
        let (image, resize) = resize_to_fit(image, bounds, self.config.filter);
        let steps = NormalizePlan { crop, resize };

        tracing::debug!(?original, ?steps, %bounds, "normalization steps");

        let output = (image.width(), image.height());
        Normalized {
            image: DecodedImage {
                image,
                format: decoded.format,
                applied_orientation: orientation,
            },
            report: NormalizeReport {
                original,
                orientation,
                plan: steps,
                output,
                written: !steps.is_noop() || orientation != Orientation::Normal,
            },
        }
    }

    /// Decode `path` and report what [`normalize`](Self::normalize) would do,
    /// without writing anything.
    pub fn inspect(&self, path: &Path, bounds: BoundingBox) -> Result<Inspection> {
        bounds.validate()?;

        let decoded = load_image(path, self.config.auto_orient)?;
        let (width, height) = decoded.dimensions();

        Ok(Inspection {
            format: decoded.format,
            dimensions: (width, height),
            orientation: decoded.applied_orientation,
            plan: plan(width, height, bounds),
        })
    }
}

/// Normalize the file at `path` with the default settings.
///
/// Convenience for one-off calls; long-lived callers should keep a
/// [`Normalizer`] so that concurrent saves share its path locks.
pub fn normalize(path: &Path, bounds: BoundingBox) -> Result<Normalized> {
    Normalizer::default().normalize(path, bounds)
}
