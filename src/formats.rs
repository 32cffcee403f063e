//! Output formats and their parameters.
//!
//! These types describe *what* to encode, not *how*; the engine does the
//! pixel work. Parameters are validated on construction (clamped into the
//! range the encoders accept), so an out-of-range value can never reach a
//! codec.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 75). Clamped on construction.
//! - [`Compression`] — PNG compression level (0–9, default 6). Clamped on construction.
//! - [`PngOptions`] / [`CsvOptions`] — Per-format knobs with sensible defaults.
//! - [`BufferFormat`] — The formats that can target an in-memory buffer. Closed set.
//! - [`FileFormat`] — The formats that can target a file, with their options.
//! - [`FORMATS`] — The registry: one [`FormatSpec`] per format, fixed at compile time.

use crate::error::{Error, Result};
use std::path::Path;
use std::sync::LazyLock;

/// Quality setting for lossy encoding (1-100).
///
/// `0` is clamped to `1`, the encoder's floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// PNG compression effort (0-9). Higher is smaller and slower.
///
/// The engine's encoder exposes a three-step ladder rather than ten discrete
/// levels; see the mapping in the codec. The scale is kept so call sites read
/// like every other zlib-style API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression(pub u8);

impl Compression {
    pub fn new(value: u8) -> Self {
        Self(value.min(9))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self(6)
    }
}

/// Options for PNG output.
///
/// `interlaced` requests Adam7 output. The engine cannot produce it and
/// refuses the request with a diagnostic; the flag exists so the capability
/// is asked for in one place and answered by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PngOptions {
    pub compression: Compression,
    pub interlaced: bool,
}

/// Options for CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Separator between values on a row. Tab by default.
    pub separator: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { separator: '\t' }
    }
}

// ---------------------------------------------------------------------------
// Format registry
// ---------------------------------------------------------------------------

/// Every format the engine can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpeg,
    Png,
    Tiff,
    Ppm,
    Csv,
}

/// Registry entry for one output format.
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    pub format: Format,
    pub name: &'static str,
    /// File extensions dispatched to this format, lowercase.
    pub extensions: &'static [&'static str],
    /// Whether the format can target an in-memory buffer.
    pub to_buffer: bool,
    /// Whether the engine can write it interlaced.
    pub interlace: bool,
}

const JPEG: FormatSpec = FormatSpec {
    format: Format::Jpeg,
    name: "jpeg",
    extensions: &["jpg", "jpeg"],
    to_buffer: true,
    interlace: false,
};

const PNG: FormatSpec = FormatSpec {
    format: Format::Png,
    name: "png",
    extensions: &["png"],
    to_buffer: true,
    interlace: false,
};

const TIFF: FormatSpec = FormatSpec {
    format: Format::Tiff,
    name: "tiff",
    extensions: &["tif", "tiff"],
    to_buffer: false,
    interlace: false,
};

const PPM: FormatSpec = FormatSpec {
    format: Format::Ppm,
    name: "ppm",
    extensions: &["ppm", "pgm", "pnm"],
    to_buffer: false,
    interlace: false,
};

const CSV: FormatSpec = FormatSpec {
    format: Format::Csv,
    name: "csv",
    extensions: &["csv"],
    to_buffer: false,
    interlace: false,
};

/// All writable formats. Fixed at compile time; there is no runtime
/// registration of any kind.
pub const FORMATS: &[FormatSpec] = &[JPEG, PNG, TIFF, PPM, CSV];

impl Format {
    /// The registry entry for this format.
    pub fn spec(self) -> &'static FormatSpec {
        match self {
            Format::Jpeg => &JPEG,
            Format::Png => &PNG,
            Format::Tiff => &TIFF,
            Format::Ppm => &PPM,
            Format::Csv => &CSV,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

/// Look up a format by file extension (case-insensitive).
pub fn from_extension(ext: &str) -> Option<Format> {
    let ext = ext.to_ascii_lowercase();
    FORMATS
        .iter()
        .find(|spec| spec.extensions.contains(&ext.as_str()))
        .map(|spec| spec.format)
}

static WRITABLE_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    FORMATS
        .iter()
        .flat_map(|spec| spec.extensions.iter().copied())
        .collect()
});

/// Returns every file extension that dispatches to a writable format.
pub fn writable_extensions() -> &'static [&'static str] {
    &WRITABLE_EXTENSIONS
}

// ---------------------------------------------------------------------------
// Encode targets
// ---------------------------------------------------------------------------

/// Formats that can encode into an owned buffer.
///
/// This is a closed set: a format missing here cannot be asked for a buffer
/// at all, which is the registry's `to_buffer` flag enforced at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFormat {
    Jpeg(Quality),
    Png(PngOptions),
}

impl BufferFormat {
    pub fn format(self) -> Format {
        match self {
            BufferFormat::Jpeg(_) => Format::Jpeg,
            BufferFormat::Png(_) => Format::Png,
        }
    }
}

/// Formats that can encode to a file, with their options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Jpeg(Quality),
    Png(PngOptions),
    Tiff,
    Ppm,
    Csv(CsvOptions),
}

impl FileFormat {
    pub fn format(self) -> Format {
        match self {
            FileFormat::Jpeg(_) => Format::Jpeg,
            FileFormat::Png(_) => Format::Png,
            FileFormat::Tiff => Format::Tiff,
            FileFormat::Ppm => Format::Ppm,
            FileFormat::Csv(_) => Format::Csv,
        }
    }

    /// Default-configured format for a path, dispatched on extension.
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = from_extension(ext).ok_or_else(|| {
            Error::new(format!("unsupported output format: {}", path.display()))
        })?;
        Ok(match format {
            Format::Jpeg => FileFormat::Jpeg(Quality::default()),
            Format::Png => FileFormat::Png(PngOptions::default()),
            Format::Tiff => FileFormat::Tiff,
            Format::Ppm => FileFormat::Ppm,
            Format::Csv => FileFormat::Csv(CsvOptions::default()),
        })
    }
}
