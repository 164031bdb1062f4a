use ndarray::Array3;

use crate::consts::CHANNEL_COUNT;
use crate::error::{CombinerError, Result};

/// One of the four independent 8-bit samples of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Alpha,
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] =
        [Channel::Alpha, Channel::Red, Channel::Green, Channel::Blue];

    /// Position of this channel in the RGBA sample layout.
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Alpha => 3,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha => write!(f, "alpha"),
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// A decoded 8-bit image with four channels per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Samples, row-major, shape = (height, width, 4) in RGBA order.
    samples: Array3<u8>,
}

impl PixelBuffer {
    /// Build a buffer from interleaved RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNEL_COUNT;
        if rgba.len() != expected {
            return Err(CombinerError::InvalidBuffer(format!(
                "{}x{} RGBA needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        let samples =
            Array3::from_shape_vec((height as usize, width as usize, CHANNEL_COUNT), rgba)
                .map_err(|e| CombinerError::InvalidBuffer(e.to_string()))?;
        Ok(Self { samples })
    }

    /// A buffer where every pixel has the same `[r, g, b, a]` value.
    pub fn filled(width: u32, height: u32, rgba: [u8; CHANNEL_COUNT]) -> Self {
        let mut samples = Array3::zeros((height as usize, width as usize, CHANNEL_COUNT));
        for mut pixel in samples.lanes_mut(ndarray::Axis(2)) {
            for (dst, src) in pixel.iter_mut().zip(rgba) {
                *dst = src;
            }
        }
        Self { samples }
    }

    pub(crate) fn zeros(width: u32, height: u32) -> Self {
        Self {
            samples: Array3::zeros((height as usize, width as usize, CHANNEL_COUNT)),
        }
    }

    pub fn width(&self) -> u32 {
        self.samples.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.samples.dim().0 as u32
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32, channel: Channel) -> u8 {
        self.samples[[y as usize, x as usize, channel.index()]]
    }

    /// Interleaved RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.samples.iter().copied().collect()
    }

    /// Interleaved RGB8 bytes, row-major, alpha dropped.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixel_count() * 3);
        for pixel in self.samples.lanes(ndarray::Axis(2)) {
            out.extend(pixel.iter().take(3));
        }
        out
    }

    pub(crate) fn samples(&self) -> &Array3<u8> {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut Array3<u8> {
        &mut self.samples
    }
}
