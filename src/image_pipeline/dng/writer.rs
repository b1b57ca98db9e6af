use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::descriptor::RawImageDescriptor;
use crate::image_pipeline::dng::types::ConversionConfig;

pub trait DngWriter {
    /// Consumes the descriptor; the pixel buffer is not needed afterwards.
    fn write_dng(&self, descriptor: RawImageDescriptor, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
