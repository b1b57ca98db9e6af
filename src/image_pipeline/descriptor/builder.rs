use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::descriptor::types::{AcquisitionParameters, ColorMode};
use crate::image_pipeline::pgm::types::{DecodedImage, ImageGeometry, PixelBuffer};

/// Normalized raw metadata, resolved against the image's bit depth.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMetadata {
    pub color: ColorMode,
    pub black_level: u32,
    pub white_level: u32,
    pub compress: bool,
}

/// A decoded image plus the metadata the DNG writer needs.
///
/// Built once per run by [`RawImageDescriptor::build`] and consumed by the
/// writer; nothing can change it in between.
#[derive(Debug, Clone)]
pub struct RawImageDescriptor {
    buffer: PixelBuffer,
    geometry: ImageGeometry,
    metadata: RawMetadata,
}

impl RawImageDescriptor {
    /// Resolves levels and checks every invariant, taking ownership of the
    /// decoded pixels.
    pub fn build(image: DecodedImage, params: AcquisitionParameters) -> Result<Self> {
        let DecodedImage { buffer, geometry } = image;

        if !matches!(geometry.bits_per_sample, 8 | 16) {
            return Err(ConversionError::UnsupportedBitDepth(geometry.max_value));
        }
        let max = i64::from(geometry.max_representable());

        let black = i64::from(params.black_level());
        let white = match params.white_level() {
            Some(level) if level > 0 => i64::from(level),
            _ => max,
        };

        if black < 0 || white > max || white <= black {
            return Err(ConversionError::InvalidLevels { black, white, max });
        }

        debug!(
            black_level = black,
            white_level = white,
            bits_per_sample = geometry.bits_per_sample,
            monochrome = params.is_monochrome(),
            "Resolved raw metadata"
        );

        let metadata = RawMetadata {
            color: params.color().clone(),
            black_level: black as u32,
            white_level: white as u32,
            compress: params.compress(),
        };

        Ok(Self {
            buffer,
            geometry,
            metadata,
        })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn metadata(&self) -> &RawMetadata {
        &self.metadata
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn bits_per_sample(&self) -> u32 {
        self.geometry.bits_per_sample
    }

    pub fn into_parts(self) -> (PixelBuffer, ImageGeometry, RawMetadata) {
        (self.buffer, self.geometry, self.metadata)
    }
}
