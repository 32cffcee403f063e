//! Source image handles.
//!
//! An [`Image`] is a cheap, shared, immutable handle to a source picture.
//! Opening one probes container headers and harvests embedded metadata but
//! defers the pixel decode until a [`Writer`](crate::Writer) materializes
//! its own copy. Corrupt pixel data therefore surfaces at writer
//! construction, not at open — headers are all an open ever reads.
//!
//! Clones share one underlying descriptor; equality is handle identity.
//! Handles are `Send + Sync` and never mutated after construction.

use crate::engine::{self, FieldValue, Fields, META_FILENAME};
use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat};
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Sample layout for rasters built from raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Gray8,
    Rgb8,
    Rgba8,
}

impl PixelLayout {
    /// Samples per pixel.
    pub fn channels(self) -> u32 {
        match self {
            PixelLayout::Gray8 => 1,
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PixelLayout::Gray8 => "gray8",
            PixelLayout::Rgb8 => "rgb8",
            PixelLayout::Rgba8 => "rgba8",
        }
    }
}

/// What a handle retains of its source.
#[derive(Debug)]
enum Source {
    /// Original encoded bytes, decoded lazily when a writer materializes.
    Encoded(Vec<u8>),
    /// Raster supplied directly by the caller.
    Raster(DynamicImage),
}

#[derive(Debug)]
struct Inner {
    source: Source,
    width: u32,
    height: u32,
    /// Container name for encoded sources, layout name for raw ones.
    format: &'static str,
    fields: Fields,
}

/// Shared handle to a source image.
///
/// Construct one with [`Image::open`], [`Image::from_memory`], or
/// [`Image::from_pixels`], then hand it to [`Writer::new`](crate::Writer::new)
/// as many times as needed — every writer takes its own copy.
#[derive(Debug, Clone)]
pub struct Image {
    inner: Arc<Inner>,
}

fn container_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Pnm => "pnm",
        _ => "unknown",
    }
}

impl Image {
    /// Open an image file.
    ///
    /// Reads the whole file, sniffs the container, probes dimensions from
    /// headers, and harvests embedded EXIF/ICC fields. The path is recorded
    /// as a `filename` text field. Pixels stay encoded until a writer needs
    /// them.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::new(format!("cannot read {}: {e}", path.display())))?;
        Self::from_encoded(bytes, Some(path))
            .map_err(|e| Error::new(format!("cannot open {}: {}", path.display(), e.message())))
    }

    /// Wrap an already-loaded encoded image (file contents, a network body).
    pub fn from_memory(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_encoded(bytes.into(), None)
    }

    /// Wrap raw 8-bit samples. `data` must hold exactly
    /// `width * height * layout.channels()` bytes.
    pub fn from_pixels(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::new(format!("zero-sized raster: {width}x{height}")));
        }
        let expected = width as u128 * height as u128 * layout.channels() as u128;
        if data.len() as u128 != expected {
            return Err(Error::new(format!(
                "raw sample buffer holds {} bytes, {width}x{height} {} needs {expected}",
                data.len(),
                layout.name()
            )));
        }
        let raster = match layout {
            PixelLayout::Gray8 => {
                image::GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
            }
            PixelLayout::Rgb8 => {
                image::RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
            }
            PixelLayout::Rgba8 => {
                image::RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
            }
        }
        .ok_or_else(|| Error::new("raw sample buffer rejected by the engine"))?;

        Ok(Self {
            inner: Arc::new(Inner {
                source: Source::Raster(raster),
                width,
                height,
                format: layout.name(),
                fields: Fields::new(),
            }),
        })
    }

    fn from_encoded(bytes: Vec<u8>, opened_from: Option<&Path>) -> Result<Self> {
        let probe = engine::probe(&bytes)?;
        let mut fields = engine::harvest(&bytes, probe.format);
        if let Some(path) = opened_from {
            fields.insert(
                META_FILENAME.to_string(),
                FieldValue::Text(path.display().to_string()),
            );
        }
        debug!(
            "opened {}x{} {} source ({} harvested fields)",
            probe.width,
            probe.height,
            container_name(probe.format),
            fields.len()
        );
        Ok(Self {
            inner: Arc::new(Inner {
                source: Source::Encoded(bytes),
                width: probe.width,
                height: probe.height,
                format: container_name(probe.format),
                fields,
            }),
        })
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Short name of the source container (`"jpeg"`, `"png"`), or the
    /// sample layout name for rasters built from raw bytes.
    pub fn format(&self) -> &'static str {
        self.inner.format
    }

    /// Blob metadata peek without materializing pixels. Same lookup rules
    /// as [`Writer::metadata`](crate::Writer::metadata).
    pub fn metadata(&self, key: &str) -> Option<&[u8]> {
        self.inner.fields.get(key).and_then(FieldValue::as_blob)
    }

    /// Whether a field of any type exists under `key`; fixed header names
    /// always test present.
    pub fn has_metadata(&self, key: &str) -> bool {
        engine::is_reserved(key) || self.inner.fields.contains_key(key)
    }

    /// Decode (or clone) the pixels and copy the field map. This is the
    /// structural copy a writer owns.
    pub(crate) fn materialize(&self) -> Result<(DynamicImage, Fields)> {
        let raster = match &self.inner.source {
            Source::Encoded(bytes) => engine::decode(bytes)?,
            Source::Raster(raster) => raster.clone(),
        };
        Ok((raster, self.inner.fields.clone()))
    }
}

impl PartialEq for Image {
    /// Handle identity: equal when both handles share one descriptor.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Image {}
