use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pgm2dng_rs::image_pipeline::{
    AcquisitionParameters, ConversionConfig, ConversionError, ErrorKind, PgmToDngPipeline,
};
use pgm2dng_rs::logger;

use tracing::{error, info};

/// PGM to DNG command line converter
#[derive(Parser, Debug)]
#[command(name = "pgm2dng", version, about)]
struct Cli {
    /// Path to the input PGM file
    #[arg(long = "in", value_name = "FILE")]
    input: PathBuf,

    /// Path to the output DNG file
    #[arg(long = "out", value_name = "FILE")]
    output: PathBuf,

    /// Write a monochrome DNG
    #[arg(long)]
    mono: bool,

    /// Camera profile (DCP) file, mandatory for color DNG
    #[arg(long, value_name = "FILE")]
    dcp: Option<PathBuf>,

    /// CFA pattern (RGGB, GBRG, GRBG or BGGR), mandatory for color DNG
    #[arg(long, value_name = "PATTERN")]
    pattern: Option<String>,

    /// White point as R,G,B, mandatory for color DNG
    #[arg(long, value_name = "R,G,B", value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
    wp: Option<Vec<f32>>,

    /// White level (default: maximum for the bit depth)
    #[arg(long, allow_negative_numbers = true)]
    white: Option<i32>,

    /// Black level
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    black: i32,

    /// Compress the image data
    #[arg(long)]
    compress: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn acquisition_parameters(&self) -> Result<AcquisitionParameters, ConversionError> {
        let mut builder = AcquisitionParameters::builder()
            .monochrome(self.mono)
            .black_level(self.black)
            .white_level(self.white)
            .compress(self.compress);
        if let Some(pattern) = &self.pattern {
            builder = builder.cfa_pattern(pattern.as_str());
        }
        if let Some(wp) = &self.wp {
            builder = builder.white_balance(wp);
        }
        if let Some(dcp) = &self.dcp {
            builder = builder.camera_profile(dcp);
        }
        builder.build()
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ErrorKind::Configuration.exit_code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logger::init(&cli.log_level);

    info!("Starting pgm2dng...");

    let result = cli.acquisition_parameters().and_then(|params| {
        info!(
            "Output: {}",
            if params.is_monochrome() { "monochrome" } else { "color" }
        );
        let pipeline = PgmToDngPipeline::new(ConversionConfig::default());
        pipeline.convert_file(&cli.input, &cli.output, params)
    });

    match result {
        Ok(()) => {
            info!("Conversion successful!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "Conversion failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
