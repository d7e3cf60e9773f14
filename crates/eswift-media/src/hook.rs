//! Post-save hook for records that carry images.
//!
//! The persistence layer writes a record's uploaded image files first and
//! then calls [`after_save`] before it reports the save as complete. Every
//! image field that holds a file is normalized exactly once, in the order
//! the record lists its fields. The first failure aborts the hook and is
//! returned to the caller, which is expected to abort the save.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::NormalizeError;
use crate::normalize::{Normalized, Normalizer};

/// The kinds of records on the listing site that own images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Property,
    PropertyImage,
    Project,
    ProjectImage,
    Agent,
    BlogPost,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Property => "property",
            RecordKind::PropertyImage => "property_image",
            RecordKind::Project => "project",
            RecordKind::ProjectImage => "project_image",
            RecordKind::Agent => "agent",
            RecordKind::BlogPost => "blog_post",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image field of a record. `path` is `None` when the field is blank.
#[derive(Debug, Clone, Copy)]
pub struct ImageField<'a> {
    pub name: &'static str,
    pub path: Option<&'a Path>,
}

impl<'a> ImageField<'a> {
    pub fn new(name: &'static str, path: Option<&'a Path>) -> Self {
        Self { name, path }
    }
}

/// Implemented by records whose image files must be normalized after save.
pub trait ImageFields {
    fn record_kind(&self) -> RecordKind;

    /// Human readable identifier for logs (title, name, ...).
    fn label(&self) -> String;

    /// Image fields in declaration order.
    fn image_fields(&self) -> Vec<ImageField<'_>>;
}

/// A normalization failure inside the post-save hook.
#[derive(Debug, Error)]
#[error("failed to normalize {kind} '{label}' field '{field}': {source}")]
pub struct HookError {
    pub kind: RecordKind,
    pub label: String,
    pub field: &'static str,
    #[source]
    pub source: NormalizeError,
}

/// Normalize every non-blank image field of `record` with the
/// normalizer's configured bounding box.
///
/// Returns one [`Normalized`] per processed field, in field order.
pub fn after_save<R>(record: &R, normalizer: &Normalizer) -> Result<Vec<Normalized>, HookError>
where
    R: ImageFields + ?Sized,
{
    let kind = record.record_kind();
    let mut results = Vec::new();

    for field in record.image_fields() {
        let Some(path) = field.path else {
            tracing::debug!(%kind, field = field.name, "image field blank, skipping");
            continue;
        };

        let normalized = normalizer
            .normalize_default(path)
            .map_err(|source| HookError {
                kind,
                label: record.label(),
                field: field.name,
                source,
            })?;
        results.push(normalized);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use image::{DynamicImage, GenericImageView};
    use std::path::PathBuf;

    struct Project {
        title: String,
        thumbnail: Option<PathBuf>,
    }

    impl ImageFields for Project {
        fn record_kind(&self) -> RecordKind {
            RecordKind::Project
        }

        fn label(&self) -> String {
            self.title.clone()
        }

        fn image_fields(&self) -> Vec<ImageField<'_>> {
            vec![ImageField::new("thumbnail", self.thumbnail.as_deref())]
        }
    }

    struct Agent {
        name: String,
        photo: Option<PathBuf>,
        cover: Option<PathBuf>,
    }

    impl ImageFields for Agent {
        fn record_kind(&self) -> RecordKind {
            RecordKind::Agent
        }

        fn label(&self) -> String {
            self.name.clone()
        }

        fn image_fields(&self) -> Vec<ImageField<'_>> {
            vec![
                ImageField::new("photo", self.photo.as_deref()),
                ImageField::new("cover", self.cover.as_deref()),
            ]
        }
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::new_rgb8(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_record_kind_display() {
        assert_eq!(RecordKind::BlogPost.to_string(), "blog_post");
        assert_eq!(RecordKind::PropertyImage.as_str(), "property_image");
    }

    #[test]
    fn test_blank_thumbnail_is_skipped() {
        let project = Project {
            title: "Riverside Towers".to_string(),
            thumbnail: None,
        };

        let results = after_save(&project, &Normalizer::default()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_every_field_normalized_once() {
        let dir = tempfile::tempdir().unwrap();
        let agent = Agent {
            name: "J. Doe".to_string(),
            photo: Some(write_png(dir.path(), "photo.png", 600, 900)),
            cover: Some(write_png(dir.path(), "cover.png", 1200, 400)),
        };

        let results = after_save(&agent, &Normalizer::default()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].report.original, (600, 900));
        assert_eq!(results[1].report.original, (1200, 400));
        assert_eq!(image::open(agent.photo.as_ref().unwrap()).unwrap().dimensions(), (500, 500));
        assert_eq!(image::open(agent.cover.as_ref().unwrap()).unwrap().dimensions(), (400, 400));
    }

    #[test]
    fn test_first_failure_aborts_with_field_context() {
        let dir = tempfile::tempdir().unwrap();
        let cover = write_png(dir.path(), "cover.png", 1200, 400);
        let agent = Agent {
            name: "J. Doe".to_string(),
            photo: Some(dir.path().join("missing.png")),
            cover: Some(cover.clone()),
        };

        let err = after_save(&agent, &Normalizer::default()).unwrap_err();

        assert_eq!(err.kind, RecordKind::Agent);
        assert_eq!(err.field, "photo");
        assert!(matches!(
            err.source,
            NormalizeError::Decode(DecodeError::Io { .. })
        ));
        assert!(err.to_string().starts_with("failed to normalize agent 'J. Doe' field 'photo'"));
        // Later fields are not touched once a field fails
        assert_eq!(image::open(&cover).unwrap().dimensions(), (1200, 400));
    }

    #[test]
    fn test_hook_uses_configured_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project {
            title: "Hilltop".to_string(),
            thumbnail: Some(write_png(dir.path(), "thumb.png", 800, 600)),
        };
        let normalizer = Normalizer::new(crate::NormalizeConfig {
            bounding_box: crate::BoundingBox::square(300),
            ..Default::default()
        })
        .unwrap();

        after_save(&project, &normalizer).unwrap();

        let thumb = project.thumbnail.as_ref().unwrap();
        assert_eq!(image::open(thumb).unwrap().dimensions(), (300, 300));
    }

    #[test]
    fn test_hook_accepts_trait_objects() {
        let project = Project {
            title: "Empty".to_string(),
            thumbnail: None,
        };
        let record: &dyn ImageFields = &project;

        assert!(after_save(record, &Normalizer::default()).unwrap().is_empty());
    }
}
