use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use pgm2dng_rs::image_pipeline::dng::{tags, TiffDirectory};
use pgm2dng_rs::image_pipeline::{
    AcquisitionParameters, ConversionConfig, ConversionError, ErrorKind, PgmToDngPipeline,
};
use tiff::decoder::{Decoder, DecodingResult};

fn write_pgm16(path: &Path, width: usize, height: usize, rows: usize) -> Vec<u16> {
    let samples: Vec<u16> = (0..width * height).map(|i| (i as u16).wrapping_mul(613)).collect();
    let mut data = format!("P5\n# test capture\n{} {}\n65535\n", width, height).into_bytes();
    data.extend(samples[..width * rows].iter().flat_map(|s| s.to_be_bytes()));
    std::fs::write(path, data).unwrap();
    samples
}

fn pipeline() -> PgmToDngPipeline<pgm2dng_rs::image_pipeline::PgmReader, pgm2dng_rs::image_pipeline::StandardDngWriter> {
    PgmToDngPipeline::new(ConversionConfig::default())
}

#[test]
fn converts_monochrome_16bit_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("capture.pgm");
    let output = dir.path().join("capture.dng");
    let samples = write_pgm16(&input, 6, 4, 4);

    let params = AcquisitionParameters::builder().monochrome(true).build().unwrap();
    pipeline().convert_file(&input, &output, params).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    let mut decoder = Decoder::new(Cursor::new(&bytes)).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (6, 4));
    match decoder.read_image().unwrap() {
        DecodingResult::U16(data) => assert_eq!(data, samples),
        _ => panic!("expected 16-bit samples"),
    }

    let directory = TiffDirectory::parse(&bytes).unwrap();
    assert_eq!(directory.u32(tags::WHITE_LEVEL), Some(65535));
}

#[test]
fn converts_color_file_with_unusable_profile() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("capture.pgm");
    let output = dir.path().join("capture.dng");
    let profile = dir.path().join("camera.dcp");
    std::fs::write(&profile, b"not a camera profile").unwrap();
    write_pgm16(&input, 4, 4, 4);

    let params = AcquisitionParameters::builder()
        .cfa_pattern("GRBG")
        .white_balance(&[2.0, 4.0, 3.0])
        .camera_profile(&profile)
        .black_level(256)
        .white_level(Some(16383))
        .build()
        .unwrap();
    pipeline().convert_file(&input, &output, params).unwrap();

    let directory = TiffDirectory::parse(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(directory.u32(tags::PHOTOMETRIC_INTERPRETATION), Some(u32::from(tags::PHOTOMETRIC_CFA)));
    assert_eq!(directory.u32_vec(tags::CFA_PATTERN), Some(vec![1, 0, 2, 1]));
    assert_eq!(directory.u32(tags::BLACK_LEVEL), Some(256));
    assert_eq!(directory.u32(tags::WHITE_LEVEL), Some(16383));
    let neutral = directory.f64_vec(tags::AS_SHOT_NEUTRAL).unwrap();
    assert!((neutral[0] - 0.5).abs() < 1e-6);
    assert!((neutral[1] - 1.0).abs() < 1e-6);
    assert!((neutral[2] - 0.75).abs() < 1e-6);
}

#[test]
fn truncated_input_creates_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("capture.pgm");
    let output = dir.path().join("capture.dng");
    write_pgm16(&input, 4, 10, 9);

    let params = AcquisitionParameters::builder().monochrome(true).build().unwrap();
    let err = pipeline().convert_file(&input, &output, params).unwrap_err();

    assert!(matches!(err, ConversionError::TruncatedPayload { rows_read: 9, height: 10 }));
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(!output.exists());
}

#[test]
fn missing_input_is_a_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let params = AcquisitionParameters::builder().monochrome(true).build().unwrap();
    let err = pipeline()
        .convert_file(dir.path().join("absent.pgm"), dir.path().join("out.dng"), params)
        .unwrap_err();

    assert!(matches!(err, ConversionError::InputReadError(_)));
    assert_eq!(err.exit_code(), 3);
}

fn pgm2dng() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pgm2dng"))
}

#[test]
fn cli_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("capture.pgm");
    let output = dir.path().join("capture.dng");
    write_pgm16(&input, 4, 4, 4);

    // Missing required flags.
    let status = pgm2dng().arg("--in").arg(&input).status().unwrap();
    assert_eq!(status.code(), Some(2));

    // Color output without pattern, white point and profile.
    let status = pgm2dng().arg("--in").arg(&input).arg("--out").arg(&output).status().unwrap();
    assert_eq!(status.code(), Some(2));
    assert!(!output.exists());

    // White level not above black level.
    let status = pgm2dng()
        .args(["--mono", "--black", "300", "--white", "200"])
        .arg("--in").arg(&input)
        .arg("--out").arg(&output)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));

    // Not a PGM.
    let bogus = dir.path().join("bogus.pgm");
    std::fs::write(&bogus, b"P6 1 1 255\n\0\0\0").unwrap();
    let status = pgm2dng().arg("--mono").arg("--in").arg(&bogus).arg("--out").arg(&output).status().unwrap();
    assert_eq!(status.code(), Some(3));
    assert!(!output.exists());

    let status = pgm2dng()
        .args(["--mono", "--compress"])
        .arg("--in").arg(&input)
        .arg("--out").arg(&output)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(output.exists());
}

#[test]
fn cli_accepts_comma_separated_white_point() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("capture.pgm");
    let output = dir.path().join("capture.dng");
    let profile = dir.path().join("camera.dcp");
    std::fs::write(&profile, b"II").unwrap();
    write_pgm16(&input, 2, 2, 2);

    let status = pgm2dng()
        .args(["--pattern", "RGGB", "--wp", "1.5,3,0.75"])
        .arg("--dcp").arg(&profile)
        .arg("--in").arg(&input)
        .arg("--out").arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let directory = TiffDirectory::parse(&std::fs::read(&output).unwrap()).unwrap();
    let neutral = directory.f64_vec(tags::AS_SHOT_NEUTRAL).unwrap();
    assert!((neutral[0] - 0.5).abs() < 1e-6);
    assert!((neutral[2] - 0.25).abs() < 1e-6);

    let status = pgm2dng()
        .args(["--pattern", "RGGB", "--wp", "1,2"])
        .arg("--dcp").arg(&profile)
        .arg("--in").arg(&input)
        .arg("--out").arg(dir.path().join("other.dng"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}
