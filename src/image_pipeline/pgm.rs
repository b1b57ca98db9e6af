//! PGM image reading module
//!
//! This module decodes single-channel binary PGM ("P5") captures into an owned
//! pixel buffer plus the geometry discovered in the header.

mod reader;
mod pgm_reader;
pub mod types;


pub use reader::RawImageReader;
pub use pgm_reader::PgmReader;
pub use types::{DecodedImage, ImageGeometry, PixelBuffer};
