//! The writer: an owned, mutable copy of a source image on its way out.
//!
//! [`Writer::new`] eagerly materializes the source — pixels decoded, field
//! map copied — so later edits to the writer never touch the [`Image`] and
//! later writers never see them. The source handle stays alive inside the
//! writer for as long as the writer does.
//!
//! Encoding comes in two shapes:
//!
//! | Call | Produces |
//! |------|----------|
//! | [`encode_to_buffer`](Writer::encode_to_buffer) | owned `Vec<u8>` (JPEG, PNG) |
//! | [`encode_to_file`](Writer::encode_to_file) | file on disk (JPEG, PNG, TIFF, PPM, CSV), returns `&Writer` for chaining |
//!
//! File writes encode fully in memory first, so a failed write never leaves
//! a half-encoded file behind an open handle.

use crate::engine::{self, Descriptor, FieldValue, META_EXIF, META_ICC};
use crate::error::{Error, Result};
use crate::formats::{BufferFormat, CsvOptions, FileFormat, PngOptions, Quality};
use crate::image::Image;
use log::debug;
use std::path::Path;

/// Owns a structural copy of one source image and encodes it on demand.
#[derive(Debug, Clone)]
pub struct Writer {
    desc: Descriptor,
    source: Image,
}

impl Writer {
    /// Materialize `source` into a private copy. Decoding happens here, so
    /// corrupt pixel data fails writer construction rather than the open.
    pub fn new(source: &Image) -> Result<Self> {
        let (raster, fields) = source.materialize()?;
        let desc = Descriptor { raster, fields };
        debug!(
            "writer holds {}x{} copy ({} channels, {} fields)",
            desc.width(),
            desc.height(),
            desc.channels(),
            desc.fields.len()
        );
        Ok(Self {
            desc,
            source: source.clone(),
        })
    }

    /// The handle this writer was built from.
    pub fn image(&self) -> &Image {
        &self.source
    }

    pub fn width(&self) -> u32 {
        self.desc.width()
    }

    pub fn height(&self) -> u32 {
        self.desc.height()
    }

    /// Samples per pixel of the materialized raster.
    pub fn channels(&self) -> u32 {
        self.desc.channels() as u32
    }

    // --- Metadata ---

    /// Blob field under `key`, if one exists. Fixed header fields and text
    /// fields exist but are not blobs, so they read as `None`.
    pub fn metadata(&self, key: &str) -> Option<&[u8]> {
        self.desc.blob(key)
    }

    /// Whether a field of any type exists under `key`. Fixed header names
    /// (`width`, `height`, ...) always test present.
    pub fn has_metadata(&self, key: &str) -> bool {
        engine::is_reserved(key) || self.desc.fields.contains_key(key)
    }

    /// Attach (or replace) a blob field. The value buffer is consumed even
    /// when the call errors.
    pub fn set_metadata(&mut self, key: &str, value: impl Into<Vec<u8>>) -> Result<()> {
        if key.is_empty() {
            return Err(Error::new("metadata field name is empty"));
        }
        if engine::is_reserved(key) {
            return Err(Error::new(format!(
                "{key} is a fixed header field and cannot be set"
            )));
        }
        self.desc
            .fields
            .insert(key.to_string(), FieldValue::Blob(value.into()));
        Ok(())
    }

    /// Drop the field under `key`. Returns whether anything was removed;
    /// fixed header fields are not stored in the map and report `false`.
    pub fn remove_metadata(&mut self, key: &str) -> bool {
        self.desc.fields.remove(key).is_some()
    }

    /// EXIF payload (raw TIFF stream, no container identifier).
    pub fn exif(&self) -> Option<&[u8]> {
        self.metadata(META_EXIF)
    }

    pub fn has_exif(&self) -> bool {
        self.has_metadata(META_EXIF)
    }

    pub fn set_exif(&mut self, exif: impl Into<Vec<u8>>) -> Result<()> {
        self.set_metadata(META_EXIF, exif)
    }

    pub fn remove_exif(&mut self) -> bool {
        self.remove_metadata(META_EXIF)
    }

    /// ICC color profile payload.
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.metadata(META_ICC)
    }

    pub fn has_icc_profile(&self) -> bool {
        self.has_metadata(META_ICC)
    }

    pub fn set_icc_profile(&mut self, profile: impl Into<Vec<u8>>) -> Result<()> {
        self.set_metadata(META_ICC, profile)
    }

    pub fn remove_icc_profile(&mut self) -> bool {
        self.remove_metadata(META_ICC)
    }

    // --- Encoding ---

    /// Encode into an owned buffer. Only formats whose registry entry
    /// allows buffer output appear in [`BufferFormat`].
    pub fn encode_to_buffer(&self, format: BufferFormat) -> Result<Vec<u8>> {
        engine::encode(&self.desc, format)
    }

    /// Encode and write to `path`, returning `&self` so writes chain:
    /// `writer.write_jpeg(a, q)?.write_tiff(b)?`.
    pub fn encode_to_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<&Self> {
        engine::write(&self.desc, path.as_ref(), format)?;
        Ok(self)
    }

    /// Write to `path`, picking the format from the file extension.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<&Self> {
        let path = path.as_ref();
        let format = FileFormat::for_path(path)?;
        self.encode_to_file(path, format)
    }

    /// JPEG bytes at the given quality.
    pub fn jpeg_buffer(&self, quality: Quality) -> Result<Vec<u8>> {
        self.encode_to_buffer(BufferFormat::Jpeg(quality))
    }

    /// PNG bytes with the given compression settings.
    pub fn png_buffer(&self, options: PngOptions) -> Result<Vec<u8>> {
        self.encode_to_buffer(BufferFormat::Png(options))
    }

    pub fn write_jpeg(&self, path: impl AsRef<Path>, quality: Quality) -> Result<&Self> {
        self.encode_to_file(path, FileFormat::Jpeg(quality))
    }

    pub fn write_png(&self, path: impl AsRef<Path>, options: PngOptions) -> Result<&Self> {
        self.encode_to_file(path, FileFormat::Png(options))
    }

    pub fn write_tiff(&self, path: impl AsRef<Path>) -> Result<&Self> {
        self.encode_to_file(path, FileFormat::Tiff)
    }

    pub fn write_ppm(&self, path: impl AsRef<Path>) -> Result<&Self> {
        self.encode_to_file(path, FileFormat::Ppm)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>, options: CsvOptions) -> Result<&Self> {
        self.encode_to_file(path, FileFormat::Csv(options))
    }
}
