//! Image processing pipeline module
//!
//! This module provides a structured approach to converting PGM sensor dumps
//! into DNG files, with separate modules for PGM reading, raw metadata
//! derivation, DNG writing, and conversion orchestration.

pub mod pgm;
pub mod descriptor;
pub mod dng;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    ErrorKind,
    Result,
};

pub use pgm::{
    DecodedImage,
    ImageGeometry,
    PixelBuffer,
    PgmReader,
    RawImageReader,
};

pub use descriptor::{
    AcquisitionParameters,
    AcquisitionParametersBuilder,
    CfaPattern,
    ColorMode,
    RawImageDescriptor,
    RawMetadata,
    WhiteBalance,
};

pub use dng::{
    CameraProfile,
    CompressionLevel,
    ConversionConfig,
    ConversionConfigBuilder,
    DngWriter,
    StandardDngWriter,
};

pub use conversions::{
    PgmToDngPipeline,
};
