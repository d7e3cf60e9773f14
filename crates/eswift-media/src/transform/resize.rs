//! Bounded downscaling.
//!
//! Images are only ever shrunk: anything that already fits inside the
//! bounding box is returned as-is.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::config::BoundingBox;

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl std::str::FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(FilterType::Nearest),
            "bilinear" => Ok(FilterType::Bilinear),
            "lanczos3" => Ok(FilterType::Lanczos3),
            other => Err(format!(
                "unknown filter '{other}' (expected nearest, bilinear or lanczos3)"
            )),
        }
    }
}

/// Calculate the dimensions that fit `width x height` inside `bounds`
/// while preserving aspect ratio.
///
/// Returns `None` when the image already fits and no resize is needed.
pub fn fit_dimensions(width: u32, height: u32, bounds: BoundingBox) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    if width <= bounds.max_width && height <= bounds.max_height {
        return None;
    }

    let scale = f64::min(
        bounds.max_width as f64 / width as f64,
        bounds.max_height as f64 / height as f64,
    );

    let new_width = ((width as f64 * scale).round() as u32).clamp(1, bounds.max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, bounds.max_height);

    Some((new_width, new_height))
}

/// Shrink `image` so that it fits inside `bounds`, preserving aspect ratio.
///
/// Returns the (possibly unchanged) image and the new dimensions if a
/// resize happened.
pub fn resize_to_fit(
    image: DynamicImage,
    bounds: BoundingBox,
    filter: FilterType,
) -> (DynamicImage, Option<(u32, u32)>) {
    match fit_dimensions(image.width(), image.height(), bounds) {
        Some((width, height)) => (
            image.resize_exact(width, height, filter.to_image_filter()),
            Some((width, height)),
        ),
        None => (image, None),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn bounds_strategy() -> impl Strategy<Value = BoundingBox> {
        (1u32..=2000, 1u32..=2000).prop_map(|(w, h)| BoundingBox::new(w, h))
    }

    proptest! {
        /// Property: the result always fits inside the bounds.
        #[test]
        fn prop_result_within_bounds(
            width in 1u32..=10_000,
            height in 1u32..=10_000,
            bounds in bounds_strategy(),
        ) {
            let (w, h) = fit_dimensions(width, height, bounds).unwrap_or((width, height));
            prop_assert!(w <= bounds.max_width);
            prop_assert!(h <= bounds.max_height);
        }

        /// Property: never upscale.
        #[test]
        fn prop_never_upscales(
            width in 1u32..=10_000,
            height in 1u32..=10_000,
            bounds in bounds_strategy(),
        ) {
            if let Some((w, h)) = fit_dimensions(width, height, bounds) {
                prop_assert!(w <= width);
                prop_assert!(h <= height);
            }
        }

        /// Property: squares stay square.
        #[test]
        fn prop_square_stays_square(side in 1u32..=10_000, bounds in bounds_strategy()) {
            if let Some((w, h)) = fit_dimensions(side, side, bounds) {
                prop_assert_eq!(w, h);
                prop_assert_eq!(w, bounds.max_width.min(bounds.max_height));
            }
        }
    }
}
