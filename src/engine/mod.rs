//! The embedded codec engine — pure Rust, no system libraries.
//!
//! The rest of the crate treats this module as the image library boundary:
//! everything that touches pixels, container bytes, or the filesystem lives
//! behind the functions here.
//!
//! - [`probe`] / [`decode`] — container sniffing and pixel decodes
//! - [`harvest`] — EXIF/ICC field extraction from source containers
//! - [`encode`] / [`write`] — buffer and file output, dispatched on format
//!
//! The split below mirrors the work: [`descriptor`] holds what a writer
//! owns, `codec` does pixel encodes, `markers` does the byte-level metadata
//! surgery.

pub mod descriptor;

mod codec;
mod markers;

pub use codec::{Probe, decode, probe};
pub use descriptor::{
    Descriptor, FieldValue, Fields, META_EXIF, META_FILENAME, META_ICC, is_reserved,
};
pub use markers::{embed, extract_exif, extract_icc, extract_png_exif};

use crate::error::{Error, Result};
use crate::formats::{BufferFormat, FileFormat};
use image::ImageFormat;
use log::debug;
use std::path::Path;

/// Fields harvested from a source container's metadata.
///
/// Absent or unparsable metadata is not an error; the map just comes back
/// emptier.
pub fn harvest(bytes: &[u8], format: ImageFormat) -> Fields {
    let mut fields = Fields::new();
    match format {
        ImageFormat::Jpeg => {
            if let Some(exif) = extract_exif(bytes) {
                fields.insert(META_EXIF.to_string(), FieldValue::Blob(exif));
            }
            if let Some(icc) = extract_icc(bytes) {
                fields.insert(META_ICC.to_string(), FieldValue::Blob(icc));
            }
        }
        ImageFormat::Png => {
            if let Some(exif) = extract_png_exif(bytes) {
                fields.insert(META_EXIF.to_string(), FieldValue::Blob(exif));
            }
        }
        _ => {}
    }
    fields
}

/// Encode a descriptor into an owned buffer.
pub fn encode(desc: &Descriptor, format: BufferFormat) -> Result<Vec<u8>> {
    match format {
        BufferFormat::Jpeg(quality) => codec::encode_jpeg(desc, quality),
        BufferFormat::Png(options) => codec::encode_png(desc, options),
    }
}

/// Encode a descriptor and write it to a path.
///
/// The encode completes into an owned buffer before the file is touched, so
/// a failed write never leaves a half-encoded file behind an open handle.
pub fn write(desc: &Descriptor, path: &Path, format: FileFormat) -> Result<()> {
    let bytes = match format {
        FileFormat::Jpeg(quality) => codec::encode_jpeg(desc, quality)?,
        FileFormat::Png(options) => codec::encode_png(desc, options)?,
        FileFormat::Tiff => codec::encode_tiff(desc)?,
        FileFormat::Ppm => codec::encode_ppm(desc)?,
        FileFormat::Csv(options) => codec::encode_csv(desc, options)?,
    };
    std::fs::write(path, &bytes)
        .map_err(|e| Error::new(format!("cannot write {}: {e}", path.display())))?;
    debug!(
        "wrote {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        format.format().name()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{CsvOptions, Quality};
    use image::{DynamicImage, RgbImage};

    fn rgb_descriptor(width: u32, height: u32) -> Descriptor {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        Descriptor {
            raster: DynamicImage::ImageRgb8(img),
            fields: Fields::new(),
        }
    }

    #[test]
    fn harvest_picks_up_jpeg_fields() {
        let plain = encode(&rgb_descriptor(10, 10), BufferFormat::Jpeg(Quality::default()))
            .unwrap();
        let tagged = embed(plain, Some(b"II*\0x"), Some(&[1, 2, 3])).unwrap();

        let fields = harvest(&tagged, ImageFormat::Jpeg);
        assert_eq!(
            fields.get(META_EXIF),
            Some(&FieldValue::Blob(b"II*\0x".to_vec()))
        );
        assert_eq!(
            fields.get(META_ICC),
            Some(&FieldValue::Blob(vec![1, 2, 3]))
        );
    }

    #[test]
    fn harvest_is_empty_for_untagged_sources() {
        let plain = encode(&rgb_descriptor(10, 10), BufferFormat::Jpeg(Quality::default()))
            .unwrap();
        assert!(harvest(&plain, ImageFormat::Jpeg).is_empty());
        assert!(harvest(&plain, ImageFormat::Tiff).is_empty());
    }

    #[test]
    fn write_creates_the_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");
        write(
            &rgb_descriptor(3, 3),
            &path,
            FileFormat::Csv(CsvOptions::default()),
        )
        .unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn write_into_missing_directory_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("no-such-dir").join("out.ppm");
        let err = write(&rgb_descriptor(3, 3), &path, FileFormat::Ppm).unwrap_err();
        assert!(err.to_string().contains("cannot write"));
        assert!(!path.exists());
    }
}
