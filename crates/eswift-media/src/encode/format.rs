//! Re-encoding into the source container format.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use super::EncodeError;

/// Encode `image` as `format`.
///
/// JPEG has no alpha channel, so transparent images are flattened to RGB
/// (or kept as grayscale). GIF is written from RGBA. WebP is always lossy,
/// from 8-bit RGB or RGBA. `quality` applies to JPEG and WebP and is clamped
/// to 1-100.
pub fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Cursor::new(Vec::new());
    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format: format!("{format:?}"),
        reason: e.to_string(),
    };

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            let flattened = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
                img if !img.color().has_color() => DynamicImage::ImageLuma8(img.to_luma8()),
                img => DynamicImage::ImageRgb8(img.to_rgb8()),
            };
            flattened.write_with_encoder(encoder).map_err(failed)?;
        }
        ImageFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_to(&mut buffer, format)
            .map_err(failed)?,
        ImageFormat::WebP => return encode_webp(image, quality.clamp(1, 100)),
        ImageFormat::Png => image.write_to(&mut buffer, format).map_err(failed)?,
        #[cfg(feature = "avif")]
        ImageFormat::Avif => to_eight_bit(image)
            .write_to(&mut buffer, format)
            .map_err(failed)?,
        other => {
            return Err(EncodeError::EncodingFailed {
                format: format!("{other:?}"),
                reason: "format not supported for output".to_string(),
            })
        }
    }

    Ok(buffer.into_inner())
}

/// Lossy WebP through libwebp; the `image` encoder only writes lossless VP8L.
fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let failed = |reason: String| EncodeError::EncodingFailed {
        format: "WebP".to_string(),
        reason,
    };

    let mut config =
        webp::WebPConfig::new().map_err(|_| failed("failed to create WebPConfig".to_string()))?;
    config.lossless = 0;
    config.quality = f32::from(quality);

    let (width, height) = (image.width(), image.height());
    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(&rgba, width, height).encode_advanced(&config)
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(&rgb, width, height).encode_advanced(&config)
    }
    .map_err(|e| failed(format!("{e:?}")))?;

    Ok(encoded.to_vec())
}

/// 8-bit RGB or RGBA, depending on whether the source has alpha.
#[cfg(feature = "avif")]
fn to_eight_bit(image: &DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}
