//! Pipeline conversions module
//!
//! This module contains orchestration logic for various image format conversions.

mod pgm_to_dng;

#[cfg(test)]
mod tests;

pub use pgm_to_dng::PgmToDngPipeline;
