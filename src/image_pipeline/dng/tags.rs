//! TIFF/DNG tag codes and the CFA tables used by the writer.
//!
//! The CFA discriminants below are the only place that knows how the DNG
//! side numbers Bayer phases; swapping encoders means editing this file.

use crate::image_pipeline::descriptor::CfaPattern;

pub const NEW_SUBFILE_TYPE: u16 = 254;
pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
pub const MAKE: u16 = 271;
pub const MODEL: u16 = 272;
pub const ORIENTATION: u16 = 274;
pub const CFA_REPEAT_PATTERN_DIM: u16 = 33421;
pub const CFA_PATTERN: u16 = 33422;
pub const DNG_VERSION: u16 = 50706;
pub const DNG_BACKWARD_VERSION: u16 = 50707;
pub const UNIQUE_CAMERA_MODEL: u16 = 50708;
pub const LOCALIZED_CAMERA_MODEL: u16 = 50709;
pub const CFA_PLANE_COLOR: u16 = 50710;
pub const CFA_LAYOUT: u16 = 50711;
pub const BLACK_LEVEL: u16 = 50714;
pub const WHITE_LEVEL: u16 = 50717;
pub const DEFAULT_SCALE: u16 = 50718;
pub const DEFAULT_CROP_ORIGIN: u16 = 50719;
pub const DEFAULT_CROP_SIZE: u16 = 50720;
pub const COLOR_MATRIX_1: u16 = 50721;
pub const COLOR_MATRIX_2: u16 = 50722;
pub const AS_SHOT_NEUTRAL: u16 = 50728;
pub const BASELINE_EXPOSURE: u16 = 50730;
pub const BASELINE_SHARPNESS: u16 = 50732;
pub const CALIBRATION_ILLUMINANT_1: u16 = 50778;
pub const CALIBRATION_ILLUMINANT_2: u16 = 50779;
pub const BEST_QUALITY_SCALE: u16 = 50780;
pub const NOISE_REDUCTION_APPLIED: u16 = 50935;
pub const PROFILE_NAME: u16 = 50936;
pub const FORWARD_MATRIX_1: u16 = 50964;
pub const FORWARD_MATRIX_2: u16 = 50965;

pub const PHOTOMETRIC_BLACK_IS_ZERO: u16 = 1;
pub const PHOTOMETRIC_CFA: u16 = 32803;

/// D65, as numbered by EXIF LightSource.
pub const ILLUMINANT_D65: u16 = 21;

/// CFA color indices: red, green, blue.
pub const CFA_PLANE_COLORS: [u8; 3] = [0, 1, 2];

/// Bayer phase discriminant of each pattern.
///
/// | pattern | phase |
/// |---------|-------|
/// | GRBG    | 0     |
/// | RGGB    | 1     |
/// | BGGR    | 2     |
/// | GBRG    | 3     |
pub fn bayer_phase(pattern: CfaPattern) -> u8 {
    match pattern {
        CfaPattern::Grbg => 0,
        CfaPattern::Rggb => 1,
        CfaPattern::Bggr => 2,
        CfaPattern::Gbrg => 3,
    }
}

/// 2x2 CFAPattern tag values indexed by Bayer phase, row-major, in
/// [`CFA_PLANE_COLORS`] indices.
const PHASE_PATTERNS: [[u8; 4]; 4] = [
    [1, 0, 2, 1],
    [0, 1, 1, 2],
    [2, 1, 1, 0],
    [1, 2, 0, 1],
];

pub fn cfa_pattern_bytes(pattern: CfaPattern) -> [u8; 4] {
    PHASE_PATTERNS[usize::from(bayer_phase(pattern))]
}
