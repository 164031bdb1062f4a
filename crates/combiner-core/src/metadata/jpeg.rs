//! Splicing an EXIF APP1 segment into a JPEG stream.
//!
//! Reading is left to the `exif` crate; it does not write JPEG containers.

use byteorder::{BigEndian, ByteOrder};

use crate::consts::MAX_APP_SEGMENT_PAYLOAD;
use crate::error::{CombinerError, Result};

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

/// A marker segment in the JPEG header, `start..end` including the marker.
#[derive(Clone, Copy, Debug)]
struct Segment {
    marker: u8,
    start: usize,
    end: usize,
}

impl Segment {
    fn payload<'a>(&self, jpeg: &'a [u8]) -> &'a [u8] {
        &jpeg[(self.start + 4).min(self.end)..self.end]
    }

    fn is_exif(&self, jpeg: &[u8]) -> bool {
        self.marker == APP1 && self.payload(jpeg).starts_with(EXIF_HEADER)
    }
}

pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, SOI])
}

/// Walk the header segments up to the start of scan (or EOI).
///
/// Returns the segments and the offset where the remaining stream begins.
fn header_segments(jpeg: &[u8]) -> Result<(Vec<Segment>, usize)> {
    if !is_jpeg(jpeg) {
        return Err(CombinerError::InvalidExif("not a JPEG stream".into()));
    }

    let mut segments = Vec::new();
    let mut pos = 2;
    loop {
        let start = pos;
        if jpeg.get(pos) != Some(&0xFF) {
            return Err(CombinerError::InvalidExif(format!(
                "expected marker at offset {pos}"
            )));
        }
        // Fill bytes
        while jpeg.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *jpeg.get(pos + 1).ok_or_else(|| {
            CombinerError::InvalidExif("truncated JPEG header".into())
        })?;

        match marker {
            SOS | EOI => return Ok((segments, start)),
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let len_bytes = jpeg.get(pos + 2..pos + 4).ok_or_else(|| {
            CombinerError::InvalidExif("truncated JPEG segment length".into())
        })?;
        let len = BigEndian::read_u16(len_bytes) as usize;
        let end = pos + 2 + len;
        if len < 2 || end > jpeg.len() {
            return Err(CombinerError::InvalidExif(format!(
                "JPEG segment {marker:#04x} at offset {start} overruns the stream"
            )));
        }
        segments.push(Segment {
            marker,
            start: pos,
            end,
        });
        pos = end;
    }
}

/// Rebuild `jpeg` with `tiff` as its only EXIF segment.
///
/// The new APP1 goes right after SOI, or after a leading JFIF APP0.
pub fn replace_exif(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>> {
    let payload_len = EXIF_HEADER.len() + tiff.len();
    if payload_len > MAX_APP_SEGMENT_PAYLOAD {
        return Err(CombinerError::InvalidExif(format!(
            "EXIF block of {payload_len} bytes does not fit in one APP1 segment"
        )));
    }

    let (segments, scan_start) = header_segments(jpeg)?;
    let mut out = Vec::with_capacity(jpeg.len() + payload_len + 4);
    out.extend_from_slice(&[0xFF, SOI]);

    let leading_app0 = segments
        .iter()
        .take_while(|s| s.marker == APP0)
        .count();
    for s in &segments[..leading_app0] {
        out.extend_from_slice(&jpeg[s.start..s.end]);
    }

    out.extend_from_slice(&[0xFF, APP1]);
    out.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);

    for s in segments[leading_app0..].iter().filter(|s| !s.is_exif(jpeg)) {
        out.extend_from_slice(&jpeg[s.start..s.end]);
    }
    out.extend_from_slice(&jpeg[scan_start..]);
    Ok(out)
}
