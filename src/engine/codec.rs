//! Decode and encode through the `image` crate's pure-Rust codecs.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `image::guess_format` + `ImageReader::into_dimensions` |
//! | Decode (JPEG, PNG, TIFF, PNM) | `image` crate (pure Rust decoders) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality`, then EXIF/ICC segment splice |
//! | Encode → PNG | `PngEncoder::new_with_quality` (fast/default/best ladder) |
//! | Encode → TIFF | `TiffEncoder` into a seekable in-memory sink |
//! | Encode → PPM/PGM | `PnmEncoder`, binary subtype picked by channel count |
//! | Encode → CSV | text dump, one line per pixel row |
//!
//! Every encoder returns owned bytes; file placement belongs to the facade.
//! JPEG output is normalized to RGB or grayscale first — the format has no
//! alpha to offer, so alpha channels are dropped rather than refused.

use super::descriptor::{Descriptor, META_EXIF, META_ICC};
use super::markers;
use crate::error::{Error, Result};
use crate::formats::{Compression, CsvOptions, Format, PngOptions, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::codecs::tiff::TiffEncoder;
use image::{
    DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, ImageFormat, ImageReader, Pixel,
};
use log::debug;
use std::io::Cursor;

/// Facts learned from container headers alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Sniff the container and read dimensions without a full pixel decode.
pub fn probe(bytes: &[u8]) -> Result<Probe> {
    let format = image::guess_format(bytes)
        .map_err(|e| Error::new(format!("unrecognized image data: {e}")))?;
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(Probe {
        format,
        width,
        height,
    })
}

/// Decode retained source bytes into an owned raster.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let raster = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(|e| Error::new(format!("decode failed: {e}")))?;
    debug!(
        "decoded {}x{} raster ({} channels)",
        raster.width(),
        raster.height(),
        raster.color().channel_count()
    );
    Ok(raster)
}

/// JPEG bytes for a descriptor, EXIF/ICC fields spliced in after SOI.
pub fn encode_jpeg(desc: &Descriptor, quality: Quality) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.value());
    match desc.channels() {
        1 | 2 => {
            let gray = desc.raster.to_luma8();
            encoder.write_image(
                gray.as_raw(),
                gray.width(),
                gray.height(),
                ExtendedColorType::L8,
            )?;
        }
        _ => {
            let rgb = desc.raster.to_rgb8();
            encoder.write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    markers::embed(out, desc.blob(META_EXIF), desc.blob(META_ICC))
}

/// PNG bytes for a descriptor. Lossless; the raster's own sample layout is
/// written as-is.
pub fn encode_png(desc: &Descriptor, options: PngOptions) -> Result<Vec<u8>> {
    if options.interlaced && !Format::Png.spec().interlace {
        return Err(Error::new(
            "interlaced PNG output is not supported by this engine",
        ));
    }
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(
        &mut out,
        compression_type(options.compression),
        FilterType::Adaptive,
    );
    desc.raster.write_with_encoder(encoder)?;
    Ok(out)
}

/// Fold the 0-9 scale onto the encoder's three-step ladder.
fn compression_type(level: Compression) -> CompressionType {
    match level.value() {
        0..=2 => CompressionType::Fast,
        3..=7 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// TIFF bytes for a descriptor. The encoder needs a seekable sink, so it
/// writes into an in-memory cursor.
pub fn encode_tiff(desc: &Descriptor) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    desc.raster.write_with_encoder(TiffEncoder::new(&mut out))?;
    Ok(out.into_inner())
}

/// Binary PNM bytes: a graymap (P5) for single-channel rasters, a pixmap
/// (P6) for everything else.
pub fn encode_ppm(desc: &Descriptor) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match desc.channels() {
        1 | 2 => {
            let gray = desc.raster.to_luma8();
            PnmEncoder::new(&mut out)
                .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
                .write_image(
                    gray.as_raw(),
                    gray.width(),
                    gray.height(),
                    ExtendedColorType::L8,
                )?;
        }
        _ => {
            let rgb = desc.raster.to_rgb8();
            PnmEncoder::new(&mut out)
                .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )?;
        }
    }
    Ok(out)
}

/// CSV bytes: one text line per pixel row, channel values interleaved left
/// to right, samples normalized to 8-bit.
pub fn encode_csv(desc: &Descriptor, options: CsvOptions) -> Result<Vec<u8>> {
    let text = match desc.channels() {
        1 | 2 => dump(&desc.raster.to_luma8(), options.separator),
        _ => dump(&desc.raster.to_rgb8(), options.separator),
    };
    Ok(text.into_bytes())
}

fn dump<P: Pixel<Subpixel = u8>>(buf: &ImageBuffer<P, Vec<u8>>, separator: char) -> String {
    let mut out = String::new();
    for y in 0..buf.height() {
        for x in 0..buf.width() {
            for (i, value) in buf.get_pixel(x, y).channels().iter().enumerate() {
                if x > 0 || i > 0 {
                    out.push(separator);
                }
                out.push_str(&value.to_string());
            }
        }
        out.push('\n');
    }
    out
}
