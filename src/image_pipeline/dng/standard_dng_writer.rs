use std::io::{Seek, Write};
use tiff::encoder::colortype::{ColorType, Gray8, Gray16};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, DirectoryEncoder, Rational, SRational, TiffEncoder, TiffKindStandard, TiffValue};
use tiff::tags::{Predictor, Tag};
use tracing::debug;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::descriptor::{ColorMode, RawImageDescriptor, RawMetadata};
use crate::image_pipeline::dng::camera_profile::{CameraProfile, Matrix3};
use crate::image_pipeline::dng::tags;
use crate::image_pipeline::dng::types::{CompressionLevel, ConversionConfig};
use crate::image_pipeline::dng::writer::DngWriter;

const DNG_VERSION: [u8; 4] = [1, 4, 0, 0];
const DNG_BACKWARD_VERSION: [u8; 4] = [1, 1, 0, 0];
/// Deflate-compressed DNGs need a 1.4 reader.
const DNG_BACKWARD_VERSION_DEFLATE: [u8; 4] = [1, 4, 0, 0];

const NEUTRAL_DENOMINATOR: u32 = 1_000_000;
const MATRIX_DENOMINATOR: i32 = 10_000;

/// Writes single-IFD, strip-based DNG files with the `tiff` encoder.
///
/// A compression request is served with Adobe Deflate and a horizontal
/// predictor, since the encoder has no lossless JPEG codec.
pub struct StandardDngWriter;

impl DngWriter for StandardDngWriter {
    fn write_dng(&self, descriptor: RawImageDescriptor, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        let (buffer, geometry, metadata) = descriptor.into_parts();
        debug!(
            "Encoding DNG image: {}x{}, {} bits",
            geometry.width, geometry.height, geometry.bits_per_sample
        );

        let width = u32::try_from(geometry.width)
            .map_err(|_| ConversionError::InvalidDimensions(geometry.width, geometry.height))?;
        let height = u32::try_from(geometry.height)
            .map_err(|_| ConversionError::InvalidDimensions(geometry.width, geometry.height))?;

        let profile = match &metadata.color {
            ColorMode::Color { camera_profile, .. } => Some(CameraProfile::load_or_identity(camera_profile)?),
            ColorMode::Monochrome => None,
        };

        let mut bytes = Vec::new();

        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut bytes))?;
        if metadata.compress {
            let level = match config.compression_level {
                CompressionLevel::Fast => DeflateLevel::Fast,
                CompressionLevel::Balanced => DeflateLevel::Balanced,
                CompressionLevel::Best => DeflateLevel::Best,
            };
            encoder = encoder
                .with_compression(Compression::Deflate(level))
                .with_predictor(Predictor::Horizontal);
        }

        let dng = DngFields {
            width,
            height,
            metadata: &metadata,
            profile: profile.as_ref(),
            config,
        };

        match geometry.bits_per_sample {
            8 => {
                let samples = buffer.samples_u8().ok_or_else(|| {
                    ConversionError::EncodeError("8-bit image without 8-bit samples".to_string())
                })?;
                write_image::<_, Gray8>(&mut encoder, &dng, &samples)?;
            }
            16 => {
                let samples = buffer.samples_u16().ok_or_else(|| {
                    ConversionError::EncodeError("16-bit image without 16-bit samples".to_string())
                })?;
                write_image::<_, Gray16>(&mut encoder, &dng, &samples)?;
            }
            bits => {
                return Err(ConversionError::EncodeError(format!(
                    "cannot store {}-bit samples",
                    bits
                )));
            }
        }
        drop(encoder);

        output.write_all(&bytes).map_err(|e| ConversionError::OutputWriteError(e.to_string()))?;

        debug!("DNG encoding complete, {} bytes", bytes.len());
        Ok(())
    }
}

/// Everything the IFD needs besides the samples.
struct DngFields<'a> {
    width: u32,
    height: u32,
    metadata: &'a RawMetadata,
    profile: Option<&'a CameraProfile>,
    config: &'a ConversionConfig,
}

fn write_image<W, C>(encoder: &mut TiffEncoder<W>, dng: &DngFields<'_>, samples: &[C::Inner]) -> Result<()>
where
    W: Write + Seek,
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(dng.width, dng.height)?;
    write_dng_tags(image.encoder(), dng)?;
    image.write_data(samples)?;
    Ok(())
}

fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

fn unit() -> Rational {
    Rational { n: 1, d: 1 }
}

fn write_dng_tags<W: Write + Seek>(dir: &mut DirectoryEncoder<'_, W, TiffKindStandard>, dng: &DngFields<'_>) -> Result<()> {
    let metadata = dng.metadata;
    let config = dng.config;
    let backward_version = if metadata.compress {
        DNG_BACKWARD_VERSION_DEFLATE
    } else {
        DNG_BACKWARD_VERSION
    };

    dir.write_tag(tag(tags::NEW_SUBFILE_TYPE), 0u32)?;
    dir.write_tag(tag(tags::MAKE), config.make.as_str())?;
    dir.write_tag(tag(tags::MODEL), config.model.as_str())?;
    dir.write_tag(tag(tags::ORIENTATION), 1u16)?;
    dir.write_tag(tag(tags::DNG_VERSION), &DNG_VERSION[..])?;
    dir.write_tag(tag(tags::DNG_BACKWARD_VERSION), &backward_version[..])?;
    dir.write_tag(tag(tags::UNIQUE_CAMERA_MODEL), config.model.as_str())?;
    dir.write_tag(tag(tags::LOCALIZED_CAMERA_MODEL), config.model.as_str())?;

    dir.write_tag(tag(tags::BLACK_LEVEL), metadata.black_level)?;
    dir.write_tag(tag(tags::WHITE_LEVEL), metadata.white_level)?;

    dir.write_tag(tag(tags::DEFAULT_SCALE), &[unit(), unit()][..])?;
    dir.write_tag(tag(tags::BEST_QUALITY_SCALE), unit())?;
    dir.write_tag(tag(tags::DEFAULT_CROP_ORIGIN), &[0u32, 0][..])?;
    dir.write_tag(tag(tags::DEFAULT_CROP_SIZE), &[dng.width, dng.height][..])?;
    dir.write_tag(tag(tags::BASELINE_EXPOSURE), SRational { n: 0, d: 1 })?;
    dir.write_tag(tag(tags::BASELINE_SHARPNESS), unit())?;
    dir.write_tag(tag(tags::NOISE_REDUCTION_APPLIED), Rational { n: 0, d: 1 })?;

    match &metadata.color {
        ColorMode::Monochrome => {
            dir.write_tag(tag(tags::PHOTOMETRIC_INTERPRETATION), tags::PHOTOMETRIC_BLACK_IS_ZERO)?;
        }
        ColorMode::Color { pattern, white_balance, .. } => {
            debug!("CFA pattern {} (Bayer phase {})", pattern, tags::bayer_phase(*pattern));
            dir.write_tag(tag(tags::PHOTOMETRIC_INTERPRETATION), tags::PHOTOMETRIC_CFA)?;
            dir.write_tag(tag(tags::CFA_REPEAT_PATTERN_DIM), &[2u16, 2][..])?;
            dir.write_tag(tag(tags::CFA_PATTERN), &tags::cfa_pattern_bytes(*pattern)[..])?;
            dir.write_tag(tag(tags::CFA_PLANE_COLOR), &tags::CFA_PLANE_COLORS[..])?;
            dir.write_tag(tag(tags::CFA_LAYOUT), 1u16)?;

            let neutral: Vec<Rational> = white_balance
                .channels()
                .iter()
                .map(|&channel| Rational {
                    n: (f64::from(channel) * f64::from(NEUTRAL_DENOMINATOR)).round() as u32,
                    d: NEUTRAL_DENOMINATOR,
                })
                .collect();
            dir.write_tag(tag(tags::AS_SHOT_NEUTRAL), neutral.as_slice())?;

            let profile = dng.profile.cloned().unwrap_or_else(CameraProfile::identity);
            write_profile_tags(dir, &profile)?;
        }
    }

    Ok(())
}

fn write_profile_tags<W: Write + Seek>(dir: &mut DirectoryEncoder<'_, W, TiffKindStandard>, profile: &CameraProfile) -> Result<()> {
    dir.write_tag(tag(tags::CALIBRATION_ILLUMINANT_1), profile.calibration_illuminant1)?;
    dir.write_tag(tag(tags::COLOR_MATRIX_1), srationals(&profile.color_matrix1).as_slice())?;

    if let (Some(illuminant), Some(matrix)) = (profile.calibration_illuminant2, &profile.color_matrix2) {
        dir.write_tag(tag(tags::CALIBRATION_ILLUMINANT_2), illuminant)?;
        dir.write_tag(tag(tags::COLOR_MATRIX_2), srationals(matrix).as_slice())?;
        if let Some(forward) = &profile.forward_matrix2 {
            dir.write_tag(tag(tags::FORWARD_MATRIX_2), srationals(forward).as_slice())?;
        }
    }
    if let Some(forward) = &profile.forward_matrix1 {
        dir.write_tag(tag(tags::FORWARD_MATRIX_1), srationals(forward).as_slice())?;
    }
    if let Some(name) = &profile.name {
        dir.write_tag(tag(tags::PROFILE_NAME), name.as_str())?;
    }
    Ok(())
}

fn srationals(matrix: &Matrix3) -> Vec<SRational> {
    matrix
        .iter()
        .map(|&v| SRational {
            n: (v * f64::from(MATRIX_DENOMINATOR)).round() as i32,
            d: MATRIX_DENOMINATOR,
        })
        .collect()
}
