use std::sync::{Arc, Mutex};
use std::io::Write;

use crate::image_pipeline::common::error::{ConversionError, ErrorKind, Result};
use crate::image_pipeline::conversions::PgmToDngPipeline;
use crate::image_pipeline::descriptor::{AcquisitionParameters, RawImageDescriptor, RawMetadata};
use crate::image_pipeline::dng::{ConversionConfig, DngWriter};
use crate::image_pipeline::pgm::{DecodedImage, ImageGeometry, PgmReader, PixelBuffer, RawImageReader};

struct MockReader {
    should_fail: bool,
    width: usize,
    height: usize,
}

impl MockReader {
    fn with_size(width: usize, height: usize) -> Self {
        Self { should_fail: false, width, height }
    }
}

impl RawImageReader for MockReader {
    fn read_raw(&self, _data: &[u8]) -> Result<DecodedImage> {
        if self.should_fail {
            return Err(ConversionError::MalformedHeader("Mock decode error".to_string()));
        }
        // Layout checks are skipped so oversized mocks stay cheap.
        let buffer = PixelBuffer::new(1, 1, 1, 1, vec![0]).unwrap();
        Ok(DecodedImage {
            buffer,
            geometry: ImageGeometry {
                width: self.width,
                height: self.height,
                max_value: 255,
                bits_per_sample: 8,
                significant_bits: 8,
            },
        })
    }
}

#[derive(Default)]
struct MockWriter {
    should_fail: bool,
    written: Arc<Mutex<Vec<(usize, usize, RawMetadata)>>>,
}

impl DngWriter for MockWriter {
    fn write_dng(&self, descriptor: RawImageDescriptor, output: &mut dyn Write, _config: &ConversionConfig) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::EncodeError("Mock encode error".to_string()));
        }
        output.write_all(b"DNG")?;
        self.written.lock().unwrap().push((
            descriptor.width(),
            descriptor.height(),
            descriptor.metadata().clone(),
        ));
        Ok(())
    }
}

fn mono() -> AcquisitionParameters {
    AcquisitionParameters::builder().monochrome(true).build().unwrap()
}

#[test]
fn test_config_builder() {
    let config = ConversionConfig::builder()
        .make("Acme")
        .model("Sensor 1")
        .validate_dimensions(false)
        .max_dimension(Some(10000))
        .build();

    assert_eq!(config.make, "Acme");
    assert_eq!(config.model, "Sensor 1");
    assert!(!config.validate_dimensions);
    assert_eq!(config.max_dimension, Some(10000));

    let default = ConversionConfig::builder().build();
    assert_eq!(default.make, "Fastvideo");
    assert_eq!(default.model, "PGM to DNG");
}

#[test]
fn test_successful_conversion() {
    let writer = MockWriter::default();
    let written = writer.written.clone();
    let pipeline = PgmToDngPipeline::with_custom(
        MockReader::with_size(1, 1),
        writer,
        ConversionConfig::default(),
    );

    let mut output = Vec::new();
    pipeline.convert(b"fake pgm data", mono(), &mut output).unwrap();

    assert_eq!(output, b"DNG");
    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].2.white_level, 255);
}

#[test]
fn test_reader_failure() {
    let writer = MockWriter::default();
    let written = writer.written.clone();
    let reader = MockReader { should_fail: true, width: 1, height: 1 };
    let pipeline = PgmToDngPipeline::with_custom(reader, writer, ConversionConfig::default());

    let mut output = Vec::new();
    let err = pipeline.convert(b"fake pgm data", mono(), &mut output).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let writer = MockWriter { should_fail: true, ..Default::default() };
    let pipeline = PgmToDngPipeline::with_custom(
        MockReader::with_size(1, 1),
        writer,
        ConversionConfig::default(),
    );

    let mut output = Vec::new();
    let err = pipeline.convert(b"fake pgm data", mono(), &mut output).unwrap_err();

    assert!(matches!(err, ConversionError::EncodeError(_)));
    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[test]
fn test_configuration_failure_skips_encoding() {
    let writer = MockWriter::default();
    let written = writer.written.clone();
    let pipeline = PgmToDngPipeline::with_custom(
        MockReader::with_size(1, 1),
        writer,
        ConversionConfig::default(),
    );
    let params = AcquisitionParameters::builder()
        .monochrome(true)
        .black_level(300)
        .white_level(Some(200))
        .build()
        .unwrap();

    let mut output = Vec::new();
    let err = pipeline.convert(b"fake pgm data", params, &mut output).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(output.is_empty());
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_dimension_validation_failure() {
    let config = ConversionConfig::builder()
        .validate_dimensions(true)
        .max_dimension(Some(5000))
        .build();
    let pipeline = PgmToDngPipeline::with_custom(
        MockReader::with_size(10000, 10),
        MockWriter::default(),
        config,
    );

    let mut output = Vec::new();
    let err = pipeline.convert(b"fake pgm data", mono(), &mut output).unwrap_err();
    assert!(matches!(err, ConversionError::InvalidDimensions(10000, 10)));
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_dimension_validation_disabled() {
    let config = ConversionConfig::builder()
        .validate_dimensions(false)
        .build();
    let pipeline = PgmToDngPipeline::with_custom(
        MockReader::with_size(100000, 10),
        MockWriter::default(),
        config,
    );

    let mut output = Vec::new();
    assert!(pipeline.convert(b"fake pgm data", mono(), &mut output).is_ok());
}

#[test]
fn test_prepare_with_real_reader() {
    let pipeline = PgmToDngPipeline::with_custom(PgmReader, MockWriter::default(), ConversionConfig::default());
    let mut data = b"P5\n# sensor dump\n2 2\n4095\n".to_vec();
    data.extend_from_slice(&[0x0f, 0xff, 0x00, 0x01, 0x08, 0x00, 0x00, 0x00]);

    let params = AcquisitionParameters::builder()
        .cfa_pattern("BGGR")
        .white_balance(&[1.0, 2.0, 4.0])
        .camera_profile("unused.dcp")
        .white_level(Some(4095))
        .build()
        .unwrap();
    let descriptor = pipeline.prepare(&data, params).unwrap();

    assert_eq!(descriptor.bits_per_sample(), 16);
    assert_eq!(descriptor.geometry().significant_bits, 12);
    assert_eq!(descriptor.metadata().white_level, 4095);
    assert_eq!(descriptor.buffer().samples_u16().unwrap(), vec![4095, 1, 2048, 0]);
}
