//! DNG camera profile (DCP) support.
//!
//! Only the color calibration tags are taken from the profile; everything
//! else in the file is ignored.

use std::path::Path;

use anyhow::{Context, ensure};
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::dng::directory::{DCP_MAGIC, TiffDirectory};
use crate::image_pipeline::dng::tags;

/// 3x3 matrix, row-major.
pub type Matrix3 = [f64; 9];

pub const IDENTITY: Matrix3 = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub struct CameraProfile {
    pub name: Option<String>,
    pub calibration_illuminant1: u16,
    pub color_matrix1: Matrix3,
    pub calibration_illuminant2: Option<u16>,
    pub color_matrix2: Option<Matrix3>,
    pub forward_matrix1: Option<Matrix3>,
    pub forward_matrix2: Option<Matrix3>,
}

impl CameraProfile {
    /// Neutral profile used when no usable DCP is available.
    pub fn identity() -> Self {
        Self {
            name: None,
            calibration_illuminant1: tags::ILLUMINANT_D65,
            color_matrix1: IDENTITY,
            calibration_illuminant2: None,
            color_matrix2: None,
            forward_matrix1: None,
            forward_matrix2: None,
        }
    }

    /// Parses the contents of a `.dcp` file.
    pub fn parse(data: &[u8]) -> anyhow::Result<Self> {
        let directory = TiffDirectory::parse(data)?;
        ensure!(
            directory.magic() == DCP_MAGIC,
            "not a camera profile (magic {:#06x})",
            directory.magic()
        );

        let color_matrix1 = matrix(&directory, tags::COLOR_MATRIX_1)?
            .context("profile has no ColorMatrix1")?;
        let illuminant = |tag| directory.u32(tag).and_then(|v| u16::try_from(v).ok());

        Ok(Self {
            name: directory.ascii(tags::PROFILE_NAME).map(str::to_string),
            calibration_illuminant1: illuminant(tags::CALIBRATION_ILLUMINANT_1).unwrap_or(0),
            color_matrix1,
            calibration_illuminant2: illuminant(tags::CALIBRATION_ILLUMINANT_2),
            color_matrix2: matrix(&directory, tags::COLOR_MATRIX_2)?,
            forward_matrix1: matrix(&directory, tags::FORWARD_MATRIX_1)?,
            forward_matrix2: matrix(&directory, tags::FORWARD_MATRIX_2)?,
        })
    }

    /// Reads a profile from disk.
    ///
    /// An unreadable file fails the encode; a file that is not a usable
    /// profile is replaced by [`CameraProfile::identity`] with a warning.
    pub fn load_or_identity(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            ConversionError::EncodeError(format!(
                "cannot read camera profile {}: {}",
                path.display(),
                e
            ))
        })?;

        match Self::parse(&data) {
            Ok(profile) => {
                debug!(
                    profile = profile.name.as_deref().unwrap_or("<unnamed>"),
                    "Loaded camera profile from {}",
                    path.display()
                );
                Ok(profile)
            }
            Err(e) => {
                warn!(
                    "Ignoring camera profile {}: {:#}; using an identity color matrix",
                    path.display(),
                    e
                );
                Ok(Self::identity())
            }
        }
    }
}

fn matrix(directory: &TiffDirectory, tag: u16) -> anyhow::Result<Option<Matrix3>> {
    let Some(values) = directory.f64_vec(tag) else {
        return Ok(None);
    };
    let matrix = <Matrix3>::try_from(values.as_slice())
        .ok()
        .with_context(|| format!("tag {} holds {} values, expected 9", tag, values.len()))?;
    Ok(Some(matrix))
}
