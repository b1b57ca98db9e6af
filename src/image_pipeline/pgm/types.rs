//! Decoded PGM data types

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Owned, row-major sample storage.
///
/// 16-bit samples are held little-endian (the on-disk big-endian pairs are
/// swapped once by the reader). Use [`PixelBuffer::samples_u8`] or
/// [`PixelBuffer::samples_u16`] to view the samples at their stored width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    row_pitch: usize,
    bytes_per_sample: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps `data`, checking that the layout is consistent with its length.
    pub fn new(
        width: usize,
        height: usize,
        row_pitch: usize,
        bytes_per_sample: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        if !matches!(bytes_per_sample, 1 | 2) {
            return Err(ConversionError::MalformedHeader(format!(
                "unsupported sample width of {} bytes",
                bytes_per_sample
            )));
        }
        let min_pitch = width
            .checked_mul(bytes_per_sample)
            .ok_or(ConversionError::InvalidDimensions(width, height))?;
        if row_pitch < min_pitch || row_pitch % bytes_per_sample != 0 {
            return Err(ConversionError::MalformedHeader(format!(
                "row pitch {} cannot hold {} samples of {} bytes",
                row_pitch, width, bytes_per_sample
            )));
        }
        let expected = row_pitch
            .checked_mul(height)
            .ok_or(ConversionError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(ConversionError::MalformedHeader(format!(
                "pixel buffer holds {} bytes, layout requires {}",
                data.len(),
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            row_pitch,
            bytes_per_sample,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row, including any padding.
    pub fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_sample
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The sample bytes of row `y`, without padding.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.row_pitch;
        Some(&self.data[start..start + self.width * self.bytes_per_sample])
    }

    /// 8-bit view; `None` when the buffer stores 16-bit samples.
    pub fn samples_u8(&self) -> Option<Vec<u8>> {
        if self.bytes_per_sample != 1 {
            return None;
        }
        if self.row_pitch == self.width {
            return Some(self.data.clone());
        }
        Some((0..self.height).filter_map(|y| self.row(y)).flatten().copied().collect())
    }

    /// 16-bit view; `None` when the buffer stores 8-bit samples.
    pub fn samples_u16(&self) -> Option<Vec<u16>> {
        if self.bytes_per_sample != 2 {
            return None;
        }
        Some(
            (0..self.height)
                .filter_map(|y| self.row(y))
                .flat_map(|row| row.chunks_exact(2))
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        )
    }
}

/// Geometry discovered while parsing the PGM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: usize,
    pub height: usize,
    /// Maximum sample value declared in the header.
    pub max_value: u32,
    /// Storage depth: 8 or 16.
    pub bits_per_sample: u32,
    /// `floor(log2(max_value + 1))`, e.g. 12 for a 4095 maximum.
    pub significant_bits: u32,
}

impl ImageGeometry {
    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample.div_ceil(8) as usize
    }

    /// Largest value representable at `bits_per_sample`.
    pub fn max_representable(&self) -> u32 {
        ((1u64 << self.bits_per_sample) - 1) as u32
    }
}

/// Output of a [`RawImageReader`](crate::image_pipeline::pgm::RawImageReader).
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub buffer: PixelBuffer,
    pub geometry: ImageGeometry,
}
