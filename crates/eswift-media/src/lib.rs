//! eswift media - listing image normalization
//!
//! Every photo attached to a property, development project, agent or blog
//! post is stored as a square thumbnail: the image is cropped to its
//! centered square and shrunk to fit a bounding box (500x500 by default),
//! then written back over the uploaded file in its original format.
//!
//! # Example
//!
//! ```ignore
//! use eswift_media::{BoundingBox, Normalizer};
//!
//! let normalizer = Normalizer::default();
//! let result = normalizer.normalize("media/property_images/house.jpg".as_ref(), BoundingBox::square(500))?;
//! println!("{:?} -> {:?}", result.report.original, result.report.output);
//! ```

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod hook;
pub mod lock;
pub mod normalize;
pub mod transform;

pub use config::{BoundingBox, NormalizeConfig};
pub use error::{NormalizeError, Result};
pub use hook::{after_save, HookError, ImageField, ImageFields, RecordKind};
pub use lock::{resolve_path, PathLocks};
pub use normalize::{
    normalize, plan, Inspection, NormalizePlan, NormalizeReport, Normalized, Normalizer,
};
pub use transform::{CropRegion, FilterType};
