use tracing::{info, instrument, warn};
use std::io::Write;
use std::path::Path;

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    descriptor::{AcquisitionParameters, RawImageDescriptor},
    dng::{ConversionConfig, DngWriter, StandardDngWriter},
    pgm::{PgmReader, RawImageReader},
};

pub struct PgmToDngPipeline<R: RawImageReader, W: DngWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
}

impl PgmToDngPipeline<PgmReader, StandardDngWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: PgmReader,
            writer: StandardDngWriter,
            config,
        }
    }
}

impl<R: RawImageReader, W: DngWriter> PgmToDngPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!(
                    "Image dimensions {}x{} exceed maximum {}",
                    width, height, max
                );
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decodes `input_data` and builds the descriptor, without encoding.
    #[instrument(skip_all, fields(input_size = input_data.len()))]
    pub fn prepare(&self, input_data: &[u8], params: AcquisitionParameters) -> Result<RawImageDescriptor> {
        let image = {
            let _span = tracing::info_span!("decode_pgm").entered();
            self.reader.read_raw(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = image.geometry.width,
                height = image.geometry.height
            ).entered();
            self.validate_dimensions(image.geometry.width, image.geometry.height)?;
        }

        let _span = tracing::info_span!("build_descriptor").entered();
        RawImageDescriptor::build(image, params)
    }

    #[instrument(skip_all, fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], params: AcquisitionParameters, output: &mut dyn Write) -> Result<()> {
        info!("Starting PGM to DNG conversion");

        let descriptor = self.prepare(input_data, params)?;
        let (width, height, bits) = (descriptor.width(), descriptor.height(), descriptor.bits_per_sample());

        {
            let _span = tracing::info_span!("encode_dng").entered();
            self.writer.write_dng(descriptor, output, &self.config)?;
        }

        info!(
            width,
            height,
            bits_per_sample = bits,
            "Conversion complete"
        );
        Ok(())
    }

    /// Converts `input_path` into `output_path`.
    ///
    /// The DNG is encoded in memory first, so no output file is created when
    /// any step fails.
    #[instrument(skip_all)]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        params: AcquisitionParameters,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let mut encoded = Vec::new();
        self.convert(&input_data, params, &mut encoded)?;

        {
            let _span = tracing::info_span!("write_output_file", bytes = encoded.len()).entered();
            std::fs::write(output_path, &encoded).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
        }

        Ok(())
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
