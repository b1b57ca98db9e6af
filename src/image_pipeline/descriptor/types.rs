//! Acquisition parameter types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// 2x2 color filter array arrangement, named from the top-left photosite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfaPattern {
    Rggb,
    Bggr,
    Gbrg,
    Grbg,
}

impl CfaPattern {
    /// Accepted names, in the order they are listed to users.
    pub const NAMES: [(&'static str, CfaPattern); 4] = [
        ("RGGB", CfaPattern::Rggb),
        ("GBRG", CfaPattern::Gbrg),
        ("GRBG", CfaPattern::Grbg),
        ("BGGR", CfaPattern::Bggr),
    ];

    pub fn name(self) -> &'static str {
        match self {
            CfaPattern::Rggb => "RGGB",
            CfaPattern::Bggr => "BGGR",
            CfaPattern::Gbrg => "GBRG",
            CfaPattern::Grbg => "GRBG",
        }
    }
}

impl FromStr for CfaPattern {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|&(_, pattern)| pattern)
            .ok_or_else(|| ConversionError::InvalidCfaPattern(s.to_string()))
    }
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// White balance (camera neutral) scaled so that its largest channel is 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalance([f32; 3]);

impl WhiteBalance {
    /// Normalizes an R, G, B triple by its maximum.
    ///
    /// Every channel must be finite and strictly positive.
    pub fn normalized(values: &[f32]) -> Result<Self> {
        let [r, g, b] = <[f32; 3]>::try_from(values).map_err(|_| {
            ConversionError::InvalidWhiteBalance(format!(
                "expected 3 values, got {}",
                values.len()
            ))
        })?;

        if let Some(bad) = [r, g, b].iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(ConversionError::InvalidWhiteBalance(format!(
                "channel value {} is not a finite positive number",
                bad
            )));
        }

        let max = r.max(g).max(b);
        Ok(Self([r / max, g / max, b / max]))
    }

    pub fn channels(&self) -> [f32; 3] {
        self.0
    }
}

/// Monochrome output, or a Bayer mosaic with everything color output needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorMode {
    Monochrome,
    Color {
        pattern: CfaPattern,
        white_balance: WhiteBalance,
        /// Camera profile (DCP) passed through to the writer.
        camera_profile: PathBuf,
    },
}

/// Validated acquisition parameters for one conversion run.
///
/// Only obtainable through [`AcquisitionParameters::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionParameters {
    color: ColorMode,
    black_level: i32,
    white_level: Option<i32>,
    compress: bool,
}

impl AcquisitionParameters {
    pub fn builder() -> AcquisitionParametersBuilder {
        AcquisitionParametersBuilder::default()
    }

    pub fn color(&self) -> &ColorMode {
        &self.color
    }

    pub fn is_monochrome(&self) -> bool {
        matches!(self.color, ColorMode::Monochrome)
    }

    pub fn black_level(&self) -> i32 {
        self.black_level
    }

    /// The requested white level; `None` or a non-positive value selects the
    /// bit-depth default.
    pub fn white_level(&self) -> Option<i32> {
        self.white_level
    }

    pub fn compress(&self) -> bool {
        self.compress
    }
}

/// Builder for AcquisitionParameters
///
/// Collects raw, possibly missing values (as they come from a command line)
/// and checks them once in [`build`](AcquisitionParametersBuilder::build).
#[derive(Debug, Default)]
pub struct AcquisitionParametersBuilder {
    monochrome: bool,
    pattern: Option<String>,
    white_balance: Option<Vec<f32>>,
    camera_profile: Option<PathBuf>,
    black_level: Option<i32>,
    white_level: Option<i32>,
    compress: bool,
}

impl AcquisitionParametersBuilder {
    pub fn monochrome(mut self, monochrome: bool) -> Self {
        self.monochrome = monochrome;
        self
    }

    pub fn cfa_pattern(mut self, name: impl Into<String>) -> Self {
        self.pattern = Some(name.into());
        self
    }

    pub fn white_balance(mut self, values: &[f32]) -> Self {
        self.white_balance = Some(values.to_vec());
        self
    }

    pub fn camera_profile(mut self, path: impl Into<PathBuf>) -> Self {
        self.camera_profile = Some(path.into());
        self
    }

    pub fn black_level(mut self, level: i32) -> Self {
        self.black_level = Some(level);
        self
    }

    pub fn white_level(mut self, level: Option<i32>) -> Self {
        self.white_level = level;
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn build(self) -> Result<AcquisitionParameters> {
        let color = if self.monochrome {
            ColorMode::Monochrome
        } else {
            let camera_profile = self
                .camera_profile
                .ok_or(ConversionError::MissingParameter("camera profile (--dcp)"))?;
            let pattern = self
                .pattern
                .ok_or(ConversionError::MissingParameter("CFA pattern (--pattern)"))?
                .parse::<CfaPattern>()?;
            let values = self
                .white_balance
                .ok_or(ConversionError::MissingParameter("white balance (--wp)"))?;
            ColorMode::Color {
                pattern,
                white_balance: WhiteBalance::normalized(&values)?,
                camera_profile,
            }
        };

        Ok(AcquisitionParameters {
            color,
            black_level: self.black_level.unwrap_or(0),
            white_level: self.white_level,
            compress: self.compress,
        })
    }
}
