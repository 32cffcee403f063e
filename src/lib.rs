//! # Imagesink
//!
//! Image writing with metadata handling. Open a picture (or wrap raw pixel
//! data), attach EXIF and ICC fields, and encode to JPEG/PNG buffers or
//! JPEG/PNG/TIFF/PPM/CSV files — all in pure Rust.
//!
//! ```no_run
//! use imagesink::{Image, PngOptions, Quality, Writer};
//!
//! fn main() -> imagesink::Result<()> {
//!     let source = Image::open("input.jpg")?;
//!
//!     let mut writer = Writer::new(&source)?;
//!     writer.set_exif(std::fs::read("camera.exif")?)?;
//!     writer
//!         .write_jpeg("tagged.jpg", Quality(92))?
//!         .write_png("tagged.png", PngOptions::default())?;
//!
//!     let _jpeg = writer.jpeg_buffer(Quality::default())?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture: Handle → Writer → Bytes
//!
//! Two types carry the whole API, connected by one copy:
//!
//! ```text
//! Image    shared immutable handle — headers probed, metadata harvested,
//!          pixels still in their container
//!    │
//!    │  Writer::new  (decode + copy the field map)
//!    ▼
//! Writer   private mutable copy — edit fields, then encode as often
//!          as needed: Vec<u8> buffers or files on disk
//! ```
//!
//! The copy is eager and structural: once a writer exists, nothing done to
//! it is visible through the handle or through other writers, and every
//! encode sees exactly the state the writer holds at that moment. A writer
//! keeps its source handle alive for its own lifetime and hands it back via
//! [`Writer::image`], so callers can build further writers from the same
//! source without keeping a separate reference around.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`image`](crate::image) | Source handles: open files, wrap encoded bytes or raw samples, peek at metadata |
//! | [`writer`] | The writer itself — metadata editing plus every encode entry point |
//! | [`formats`] | Quality/compression parameters, output options, and the format registry |
//! | [`error`] | The single error type and the crate-wide `Result` alias |
//!
//! A private `engine` module underneath holds the codecs and the JPEG/PNG
//! segment plumbing (EXIF/ICC extraction and embedding).
//!
//! # Design Decisions
//!
//! ## Copy at Writer Construction
//!
//! [`Writer::new`] materializes the source immediately — pixels decoded,
//! fields cloned — instead of sharing state with the handle. Writers built
//! from one source are fully independent, and corrupt pixel data fails
//! loudly at construction rather than halfway through a write. The price is
//! one decode per writer, which is also where all decode cost lives:
//! opening an [`Image`] only reads container headers.
//!
//! ## Owned Buffers, Even for Files
//!
//! Every encoder produces an owned `Vec<u8>`; file output is that buffer
//! plus one [`std::fs::write`]. There is no streaming path to keep open
//! across a failure, so an encode error never leaves a half-written file,
//! and buffer and file output cannot drift apart — they are the same bytes.
//! It also makes JPEG metadata embedding a pure byte-splice on the encoded
//! output.
//!
//! ## A Const Format Registry
//!
//! Per-format capabilities live in one table, [`formats::FORMATS`]: names,
//! extensions, whether buffer output exists, whether interlaced output is
//! supported. Extension dispatch in [`Writer::write`] and the buffer/file
//! split in [`BufferFormat`]/[`FileFormat`] read from it, so adding a
//! format is one table entry plus one encoder.
//!
//! ## Metadata as Named Fields
//!
//! Metadata is a string-keyed field map. EXIF and ICC payloads are ordinary
//! blob fields under [`META_EXIF`] and [`META_ICC`] with convenience
//! accessors on the writer; fixed header properties (`width`, `height`,
//! `channels`, `format`) always test present but cannot be set or removed.
//!
//! ## Pure-Rust Codecs (No System Libraries)
//!
//! All encoding and decoding goes through the `image` crate — no
//! ImageMagick, no libjpeg, no `apt install`. A program using this crate is
//! fully self-contained and behaves identically on any machine.

pub mod error;
pub mod formats;
pub mod image;
pub mod writer;

mod engine;

pub use crate::engine::{META_EXIF, META_FILENAME, META_ICC};
pub use crate::error::{Error, Result};
pub use crate::formats::{
    BufferFormat, Compression, CsvOptions, FileFormat, Format, PngOptions, Quality,
};
pub use crate::image::{Image, PixelLayout};
pub use crate::writer::Writer;
