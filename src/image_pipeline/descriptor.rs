//! Raw image descriptor module
//!
//! Validates user-supplied acquisition parameters against the geometry found
//! in the PGM header and assembles the immutable [`RawImageDescriptor`] that
//! is handed to the DNG writer.

mod builder;
pub mod types;


pub use builder::{RawImageDescriptor, RawMetadata};
pub use types::{
    AcquisitionParameters,
    AcquisitionParametersBuilder,
    CfaPattern,
    ColorMode,
    WhiteBalance,
};
