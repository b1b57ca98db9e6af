//! Binary PGM ("P5") reader.
//!
//! The header is ASCII: the magic token followed by width, height and the
//! maximum sample value, separated by arbitrary whitespace and newlines and
//! possibly interrupted by `#` comments. Exactly one whitespace byte follows
//! the maximum value; the sample payload starts right after it.

use std::io::{BufRead, Cursor, ErrorKind, Read};

use tracing::debug;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::pgm::reader::RawImageReader;
use crate::image_pipeline::pgm::types::{DecodedImage, ImageGeometry, PixelBuffer};

const MAGIC: &[u8; 2] = b"P5";

/// Largest maximum value the 16-bit layout can describe.
const MAX_SUPPORTED_VALUE: u32 = u16::MAX as u32;

pub struct PgmReader;

impl RawImageReader for PgmReader {
    /// Decodes a complete PGM file held in memory.
    ///
    /// No partial image is ever returned: any header or payload error fails
    /// the whole read.
    fn read_raw(&self, data: &[u8]) -> Result<DecodedImage> {
        debug!("Decoding PGM image, {} bytes", data.len());
        let mut cursor = Cursor::new(data);
        let image = self.read_from(&mut cursor)?;

        let trailing = data.len() as u64 - cursor.position();
        if trailing > 0 {
            debug!("Ignoring {} trailing bytes after the PGM payload", trailing);
        }
        Ok(image)
    }
}

impl PgmReader {
    /// Decodes a PGM image from any buffered stream.
    pub fn read_from<R: BufRead>(&self, reader: &mut R) -> Result<DecodedImage> {
        let geometry = read_header(reader)?;
        debug!(
            "PGM header: {}x{}, max value {} ({} bits stored, {} significant)",
            geometry.width,
            geometry.height,
            geometry.max_value,
            geometry.bits_per_sample,
            geometry.significant_bits
        );

        let buffer = read_payload(reader, &geometry)?;
        Ok(DecodedImage { buffer, geometry })
    }
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<ImageGeometry> {
    let mut tokens = HeaderTokenizer { reader };
    tokens.expect_magic()?;

    let width = tokens.next_integer("width")?;
    let height = tokens.next_integer("height")?;
    let max_value = tokens.next_integer("maximum value")?;
    tokens.consume_separator()?;

    if width == 0 || height == 0 {
        return Err(ConversionError::InvalidDimensions(width as usize, height as usize));
    }

    let (bits_per_sample, significant_bits) = bit_depth(max_value)?;

    Ok(ImageGeometry {
        width: width as usize,
        height: height as usize,
        max_value,
        bits_per_sample,
        significant_bits,
    })
}

/// Returns `(stored_bits, significant_bits)` for a declared maximum value.
fn bit_depth(max_value: u32) -> Result<(u32, u32)> {
    if max_value == 0 || max_value > MAX_SUPPORTED_VALUE {
        return Err(ConversionError::UnsupportedBitDepth(max_value));
    }
    // floor(log2(max_value + 1)) without going through floating point.
    let significant_bits = u32::BITS - 1 - (max_value + 1).leading_zeros();
    let stored_bits = if max_value <= u8::MAX as u32 { 8 } else { 16 };
    Ok((stored_bits, significant_bits))
}

fn read_payload<R: Read>(reader: &mut R, geometry: &ImageGeometry) -> Result<PixelBuffer> {
    let bytes_per_sample = geometry.bytes_per_sample();
    let too_large = || ConversionError::InvalidDimensions(geometry.width, geometry.height);
    let row_bytes = geometry.width.checked_mul(bytes_per_sample).ok_or_else(too_large)?;
    let row_pitch = row_bytes;
    let total = row_pitch.checked_mul(geometry.height).ok_or_else(too_large)?;

    let mut data = vec![0u8; total];
    for (y, row) in data.chunks_exact_mut(row_pitch).enumerate() {
        let samples = &mut row[..row_bytes];
        reader.read_exact(samples).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => ConversionError::TruncatedPayload {
                rows_read: y,
                height: geometry.height,
            },
            _ => ConversionError::IoError(e),
        })?;

        // The on-disk order is big-endian; the swap is unconditional.
        if bytes_per_sample == 2 {
            for pair in samples.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        }
    }

    PixelBuffer::new(geometry.width, geometry.height, row_pitch, bytes_per_sample, data)
}

struct HeaderTokenizer<'a, R: BufRead> {
    reader: &'a mut R,
}

impl<R: BufRead> HeaderTokenizer<'_, R> {
    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }

    /// Skips whitespace, blank lines and `#` comments up to the next token.
    fn skip_separators(&mut self) -> Result<()> {
        while let Some(byte) = self.peek()? {
            if byte == b'#' {
                let mut comment = Vec::new();
                self.reader.read_until(b'\n', &mut comment)?;
            } else if byte.is_ascii_whitespace() {
                self.reader.consume(1);
            } else {
                break;
            }
        }
        Ok(())
    }

    fn expect_magic(&mut self) -> Result<()> {
        self.skip_separators()?;

        let mut magic = Vec::with_capacity(MAGIC.len());
        while magic.len() < MAGIC.len() {
            match self.peek()? {
                Some(byte) => {
                    magic.push(byte);
                    self.reader.consume(1);
                }
                None => break,
            }
        }
        // "P55" is not "P5"; the token must end here.
        let token_continues = self.peek()?.is_some_and(|b| !b.is_ascii_whitespace() && b != b'#');
        if magic != MAGIC || token_continues {
            return Err(ConversionError::InvalidMagic(
                String::from_utf8_lossy(&magic).into_owned(),
            ));
        }
        Ok(())
    }

    fn next_integer(&mut self, field: &str) -> Result<u32> {
        self.skip_separators()?;

        let mut value: u32 = 0;
        let mut digits = 0usize;
        while let Some(byte) = self.peek()? {
            if !byte.is_ascii_digit() {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(byte - b'0')))
                .ok_or_else(|| ConversionError::MalformedHeader(format!("{} is too large", field)))?;
            digits += 1;
            self.reader.consume(1);
        }

        if digits == 0 {
            return Err(match self.peek()? {
                None => ConversionError::MalformedHeader(format!(
                    "end of stream before {}",
                    field
                )),
                Some(byte) => ConversionError::MalformedHeader(format!(
                    "expected {}, found {:?}",
                    field,
                    char::from(byte)
                )),
            });
        }

        match self.peek()? {
            Some(byte) if !byte.is_ascii_whitespace() && byte != b'#' => {
                Err(ConversionError::MalformedHeader(format!(
                    "unexpected {:?} after {}",
                    char::from(byte),
                    field
                )))
            }
            _ => Ok(value),
        }
    }

    /// Consumes the single whitespace byte that ends the header.
    fn consume_separator(&mut self) -> Result<()> {
        match self.peek()? {
            Some(byte) if byte.is_ascii_whitespace() => {
                self.reader.consume(1);
                Ok(())
            }
            Some(_) => Err(ConversionError::MalformedHeader(
                "missing separator between header and pixel data".to_string(),
            )),
            // An empty payload is reported by the pixel read.
            None => Ok(()),
        }
    }
}
