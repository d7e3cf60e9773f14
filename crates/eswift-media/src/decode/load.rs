//! Loading raster images from disk with format detection and EXIF orientation.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// How far into the file to look for an `<svg` root element.
const SVG_SNIFF_LEN: usize = 1024;

/// Load and decode the image stored at `path`.
///
/// The container format is detected from the file's magic bytes. Vector
/// files are rejected with [`DecodeError::VectorFormat`], formats this
/// build cannot decode with [`DecodeError::UnsupportedFormat`].
///
/// When `auto_orient` is set, the EXIF orientation tag is applied so that
/// the returned pixels are in display orientation.
pub fn load_image(path: &Path, auto_orient: bool) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode_bytes(path, &bytes, auto_orient)
}

/// Decode an in-memory image file. `path` is used for vector detection
/// and error context only.
pub fn decode_bytes(
    path: &Path,
    bytes: &[u8],
    auto_orient: bool,
) -> Result<DecodedImage, DecodeError> {
    let format = detect_format(path, bytes)?;

    let img = ImageReader::with_format(Cursor::new(bytes), format)
        .decode()
        .map_err(|e| DecodeError::CorruptedFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage {
            path: path.to_path_buf(),
        });
    }

    let mut decoded = DecodedImage::new(img, format);
    if auto_orient {
        let orientation = get_orientation(bytes);
        if orientation != Orientation::Normal {
            tracing::debug!(path = %path.display(), ?orientation, "applying EXIF orientation");
            decoded.image = orientation.apply(decoded.image);
            decoded.applied_orientation = orientation;
        }
    }

    Ok(decoded)
}

/// Detect the raster format of `bytes`, rejecting vector and unsupported files.
pub fn detect_format(path: &Path, bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    if is_vector(path, bytes) {
        return Err(DecodeError::VectorFormat {
            path: path.to_path_buf(),
        });
    }

    if bytes.is_empty() {
        return Err(DecodeError::CorruptedFile {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat {
        path: path.to_path_buf(),
        format: "unknown".to_string(),
    })?;

    if !is_supported(format) {
        return Err(DecodeError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: format!("{format:?}"),
        });
    }

    Ok(format)
}

/// Raster formats the normalizer reads and writes.
pub fn is_supported(format: ImageFormat) -> bool {
    match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP => true,
        ImageFormat::Avif => cfg!(feature = "avif"),
        _ => false,
    }
}

/// Check whether the file is an SVG, by extension or by its XML prologue.
pub fn is_vector(path: &Path, bytes: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg") || e.eq_ignore_ascii_case("svgz"))
        .unwrap_or(false);
    if by_extension {
        return true;
    }

    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);

    match skip_xml_prolog(head) {
        Some(root) => root.starts_with(b"<svg"),
        // Prolog runs past the sniff window: settle for any `<svg` in it
        None => head.windows(4).any(|w| w == b"<svg"),
    }
}

/// Skip whitespace, comments, processing instructions and the DOCTYPE
/// declaration in front of the root element.
///
/// Returns `None` when one of them is not terminated within `head`.
fn skip_xml_prolog(mut head: &[u8]) -> Option<&[u8]> {
    loop {
        let start = head
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(head.len());
        head = &head[start..];

        let end = if head.starts_with(b"<!--") {
            find(head, b"-->")? + 3
        } else if head.starts_with(b"<?") {
            find(head, b"?>")? + 2
        } else if head.starts_with(b"<!") {
            // `<!DOCTYPE svg [ <!ENTITY ...> ]>` nests `>` inside its subset
            let close = find(head, b">")?;
            match find(&head[..close], b"[") {
                Some(open) => {
                    let subset_end = open + find(&head[open..], b"]")?;
                    subset_end + find(&head[subset_end..], b">")? + 1
                }
                None => close + 1,
            }
        } else {
            return Some(head);
        };
        head = &head[end..];
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Extract the EXIF orientation from an image container.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
