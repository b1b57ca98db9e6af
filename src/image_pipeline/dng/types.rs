//! DNG conversion configuration types

/// Deflate effort used when a run asks for compression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Fastest, largest file
    Fast,
    /// Speed/size balance (default)
    Balanced,
    /// Smallest file, slowest
    Best,
}

/// Configuration for PGM to DNG conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Camera make written to the DNG
    pub make: String,
    /// Camera model, also used as the unique camera model
    pub model: String,
    /// Whether to validate image dimensions before conversion
    pub validate_dimensions: bool,
    /// Largest accepted width or height
    pub max_dimension: Option<usize>,
    /// Deflate effort for compressed output
    pub compression_level: CompressionLevel,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            make: "Fastvideo".to_string(),
            model: "PGM to DNG".to_string(),
            validate_dimensions: true,
            max_dimension: Some(u16::MAX as usize),
            compression_level: CompressionLevel::Balanced,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    make: Option<String>,
    model: Option<String>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    compression_level: Option<CompressionLevel>,
}

impl ConversionConfigBuilder {
    pub fn make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn compression_level(mut self, level: CompressionLevel) -> Self {
        self.compression_level = Some(level);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            make: self.make.unwrap_or(default.make),
            model: self.model.unwrap_or(default.model),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            compression_level: self.compression_level.unwrap_or(default.compression_level),
        }
    }
}
