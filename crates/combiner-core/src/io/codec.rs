use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{CombinerError, Result};
use crate::io::source::ImageSource;

/// Encoded output format of a composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Whether EXIF metadata can be embedded in this format.
    pub fn supports_metadata(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "JPEG"),
            Self::Png => write!(f, "PNG"),
        }
    }
}

/// Turns an encoded source into pixels.
pub trait Decoder: Send + Sync {
    fn decode(&self, source: &dyn ImageSource) -> Result<PixelBuffer>;
}

/// Turns pixels into encoded bytes.
pub trait Encoder: Send + Sync {
    /// `quality` is on a 0-100 scale and only affects lossy formats.
    fn encode(&self, buffer: &PixelBuffer, format: OutputFormat, quality: u8) -> Result<Vec<u8>>;
}

/// Decoder and encoder backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec;

impl Decoder for ImageCodec {
    fn decode(&self, source: &dyn ImageSource) -> Result<PixelBuffer> {
        let decode_err = |reason: String| CombinerError::Decode {
            source_name: source.name(),
            reason,
        };

        let bytes = source.read_all().map_err(|e| decode_err(e.to_string()))?;
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(e.to_string()))?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;

        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        PixelBuffer::from_rgba8(w, h, rgba.into_raw())
    }
}

impl Encoder for ImageCodec {
    fn encode(&self, buffer: &PixelBuffer, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let (w, h) = buffer.dimensions();
        let mut out = Vec::new();
        match format {
            // JPEG has no alpha channel; it is dropped.
            OutputFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).write_image(
                    &buffer.to_rgb8(),
                    w,
                    h,
                    ExtendedColorType::Rgb8,
                )?;
            }
            OutputFormat::Png => {
                PngEncoder::new(&mut out).write_image(
                    &buffer.to_rgba8(),
                    w,
                    h,
                    ExtendedColorType::Rgba8,
                )?;
            }
        }
        Ok(out)
    }
}
