//! The descriptor a writer owns: an owned raster plus named header fields.

use image::DynamicImage;
use std::collections::BTreeMap;

/// Field name for the EXIF blob (stored without the `Exif\0\0` identifier).
pub const META_EXIF: &str = "exif-data";

/// Field name for the raw ICC profile blob.
pub const META_ICC: &str = "icc-profile-data";

/// Field name recording the path a handle was opened from. A text field,
/// so it tests present but never reads back as a blob.
pub const META_FILENAME: &str = "filename";

/// Value of a named descriptor field.
///
/// The metadata API traffics in blobs; text fields exist so intrinsic facts
/// like the source filename can ride in the same map without pretending to
/// be binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Blob(Vec<u8>),
    Text(String),
}

impl FieldValue {
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Blob(bytes) => Some(bytes),
            FieldValue::Text(_) => None,
        }
    }
}

/// Named fields attached to a descriptor. Ordered map for deterministic
/// iteration in logs and tests.
pub type Fields = BTreeMap<String, FieldValue>;

/// Fixed header fields every descriptor carries. They always test present,
/// never read back as blobs, and refuse set/remove through the metadata API.
pub const RESERVED_FIELDS: &[&str] = &["width", "height", "channels", "format"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// A fully materialized image: decoded pixels plus a copy of the source's
/// named fields. Encodes read from this, never from the source.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub raster: DynamicImage,
    pub fields: Fields,
}

impl Descriptor {
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Samples per pixel of the raster.
    pub fn channels(&self) -> u8 {
        self.raster.color().channel_count()
    }

    /// Blob field by name; `None` when missing or not a blob.
    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.fields.get(key).and_then(FieldValue::as_blob)
    }
}
