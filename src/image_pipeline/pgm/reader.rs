use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::pgm::types::DecodedImage;

pub trait RawImageReader {
    fn read_raw(&self, data: &[u8]) -> Result<DecodedImage>;
}
