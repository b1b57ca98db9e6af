//! DNG writing module
//!
//! This module is the encoder boundary: it turns a [`RawImageDescriptor`]
//! into a DNG file, embedding the camera profile referenced by the run.
//!
//! [`RawImageDescriptor`]: crate::image_pipeline::descriptor::RawImageDescriptor

mod writer;
mod standard_dng_writer;
pub mod camera_profile;
pub mod directory;
pub mod tags;
pub mod types;


pub use writer::DngWriter;
pub use standard_dng_writer::StandardDngWriter;
pub use camera_profile::CameraProfile;
pub use directory::{FieldValue, TiffDirectory};
pub use types::{CompressionLevel, ConversionConfig, ConversionConfigBuilder};
