//! JPEG segment and PNG chunk handling for metadata harvest and embedding.
//!
//! Harvest side:
//! - JPEG EXIF: APP1 segment whose payload starts with `Exif\0\0`.
//! - JPEG ICC: APP2 segments tagged `ICC_PROFILE\0`, each carrying a 1-based
//!   sequence byte and a total-count byte; chunks are reassembled in sequence
//!   order.
//! - PNG EXIF: the `eXIf` chunk, raw payload.
//!
//! Embed side: freshly encoded JPEG gets APP1/APP2 segments spliced in right
//! after the SOI marker.
//!
//! Segment layout (length-bearing markers):
//!   Byte 0:    0xFF
//!   Byte 1:    marker
//!   Bytes 2-3: length (big-endian, counts itself but not the marker)
//!   Bytes 4+:  payload

use crate::error::{Error, Result};
use std::ops::Range;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP1: u8 = 0xE1;
const APP2: u8 = 0xE2;

const EXIF_IDENTIFIER: &[u8] = b"Exif\0\0";
const ICC_IDENTIFIER: &[u8] = b"ICC_PROFILE\0";

/// Largest payload a segment can hold: the u16 length field minus itself.
const MAX_SEGMENT_DATA: usize = 65533;

/// Room left for profile bytes in one APP2 after the identifier and the
/// sequence/count pair.
const MAX_ICC_CHUNK: usize = MAX_SEGMENT_DATA - ICC_IDENTIFIER.len() - 2;

/// Chunked APP2 sequence numbers are a single byte.
const MAX_ICC_CHUNKS: usize = 255;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// ---------------------------------------------------------------------------
// Segment scanning
// ---------------------------------------------------------------------------

/// Marker and payload range of every length-bearing segment before the scan
/// data starts. Tolerates stray bytes between segments; stops on anything
/// truncated.
fn scan_segments(data: &[u8]) -> Vec<(u8, Range<usize>)> {
    let mut found = Vec::new();
    if !data.starts_with(&SOI) {
        return found;
    }

    let mut pos = 2;
    while pos + 2 <= data.len() {
        // Markers start with a lone 0xFF; 0xFF 0x00 is a stuffed byte and
        // 0xFF 0xFF is fill.
        if data[pos] != 0xFF || data[pos + 1] == 0x00 || data[pos + 1] == 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];

        // SOS means entropy-coded data follows; stop scanning.
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // SOI and restart markers carry no length field.
        if (0xD0..=0xD8).contains(&marker) {
            pos += 2;
            continue;
        }
        if pos + 4 > data.len() {
            break;
        }

        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if length < 2 || pos + 2 + length > data.len() {
            break;
        }
        found.push((marker, pos + 4..pos + 2 + length));
        pos += 2 + length;
    }
    found
}

/// EXIF payload (without the `Exif\0\0` identifier) from the first APP1
/// segment that carries one.
pub fn extract_exif(data: &[u8]) -> Option<Vec<u8>> {
    scan_segments(data).into_iter().find_map(|(marker, range)| {
        if marker != APP1 {
            return None;
        }
        data[range]
            .strip_prefix(EXIF_IDENTIFIER)
            .map(|tiff| tiff.to_vec())
    })
}

/// ICC profile reassembled from the chunked APP2 `ICC_PROFILE` segments.
///
/// Chunks are not required to appear in file order, so reassembly sorts by
/// the sequence byte.
pub fn extract_icc(data: &[u8]) -> Option<Vec<u8>> {
    let mut chunks: Vec<(u8, &[u8])> = Vec::new();
    for (marker, range) in scan_segments(data) {
        if marker != APP2 {
            continue;
        }
        let Some(rest) = data[range].strip_prefix(ICC_IDENTIFIER) else {
            continue;
        };
        if rest.len() < 2 {
            continue;
        }
        // rest[0] = sequence (1-based), rest[1] = total count (unused here)
        chunks.push((rest[0], &rest[2..]));
    }
    if chunks.is_empty() {
        return None;
    }
    chunks.sort_by_key(|(seq, _)| *seq);

    let total = chunks.iter().map(|(_, chunk)| chunk.len()).sum();
    let mut profile = Vec::with_capacity(total);
    for (_, chunk) in chunks {
        profile.extend_from_slice(chunk);
    }
    Some(profile)
}

/// EXIF payload from a PNG `eXIf` chunk, if present.
pub fn extract_png_exif(data: &[u8]) -> Option<Vec<u8>> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return None;
    }
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let length = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        let kind = &data[pos + 4..pos + 8];
        let body = pos + 8;
        if body + length > data.len() {
            return None;
        }
        if kind == b"eXIf" {
            return Some(data[body..body + length].to_vec());
        }
        if kind == b"IEND" {
            return None;
        }
        pos = body + length + 4; // skip the CRC
    }
    None
}

// ---------------------------------------------------------------------------
// Segment building and splicing
// ---------------------------------------------------------------------------

/// Complete APP1 segment (marker, length, identifier, payload) for an EXIF blob.
fn exif_segment(exif: &[u8]) -> Result<Vec<u8>> {
    let payload_len = EXIF_IDENTIFIER.len() + exif.len();
    if payload_len > MAX_SEGMENT_DATA {
        return Err(Error::new(format!(
            "EXIF blob of {} bytes exceeds the {} byte segment limit",
            exif.len(),
            MAX_SEGMENT_DATA - EXIF_IDENTIFIER.len()
        )));
    }
    let mut segment = Vec::with_capacity(4 + payload_len);
    segment.extend_from_slice(&[0xFF, APP1]);
    segment.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
    segment.extend_from_slice(EXIF_IDENTIFIER);
    segment.extend_from_slice(exif);
    Ok(segment)
}

/// Chunked APP2 segments for an ICC profile, sequence-numbered from 1.
fn icc_segments(profile: &[u8]) -> Result<Vec<u8>> {
    let chunks: Vec<&[u8]> = if profile.is_empty() {
        vec![&[]]
    } else {
        profile.chunks(MAX_ICC_CHUNK).collect()
    };
    if chunks.len() > MAX_ICC_CHUNKS {
        return Err(Error::new(format!(
            "ICC profile of {} bytes needs {} chunks; the APP2 scheme caps at {}",
            profile.len(),
            chunks.len(),
            MAX_ICC_CHUNKS
        )));
    }

    let mut out = Vec::with_capacity(profile.len() + chunks.len() * 18);
    for (index, chunk) in chunks.iter().enumerate() {
        let payload_len = ICC_IDENTIFIER.len() + 2 + chunk.len();
        out.extend_from_slice(&[0xFF, APP2]);
        out.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
        out.extend_from_slice(ICC_IDENTIFIER);
        out.push((index + 1) as u8);
        out.push(chunks.len() as u8);
        out.extend_from_slice(chunk);
    }
    Ok(out)
}

/// Splice EXIF and ICC segments into a freshly encoded JPEG, right after SOI.
///
/// With nothing to embed the input passes through untouched.
pub fn embed(jpeg: Vec<u8>, exif: Option<&[u8]>, icc: Option<&[u8]>) -> Result<Vec<u8>> {
    if exif.is_none() && icc.is_none() {
        return Ok(jpeg);
    }
    if !jpeg.starts_with(&SOI) {
        return Err(Error::new(
            "encoder produced data without a JPEG start-of-image marker",
        ));
    }

    let mut inject = Vec::new();
    if let Some(exif) = exif {
        inject.extend_from_slice(&exif_segment(exif)?);
    }
    if let Some(icc) = icc {
        inject.extend_from_slice(&icc_segments(icc)?);
    }

    let mut spliced = Vec::with_capacity(jpeg.len() + inject.len());
    spliced.extend_from_slice(&SOI);
    spliced.extend_from_slice(&inject);
    spliced.extend_from_slice(&jpeg[2..]);
    Ok(spliced)
}
