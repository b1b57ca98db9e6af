use thiserror::Error;

/// Failure category, used to pick the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be read or is not a supported PGM.
    Decode,
    /// The acquisition parameters are missing or inconsistent.
    Configuration,
    /// The DNG encoder or the output sink failed.
    Encoding,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Decode => 3,
            ErrorKind::Encoding => 4,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Invalid PGM magic token: expected \"P5\", found {0:?}")]
    InvalidMagic(String),

    #[error("Malformed PGM header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported PGM maximum value {0}: only 8-bit and 16-bit samples are supported")]
    UnsupportedBitDepth(u32),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Truncated PGM payload: only {rows_read} of {height} rows present")]
    TruncatedPayload { rows_read: usize, height: usize },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid CFA pattern {0:?}: expected one of RGGB, BGGR, GBRG, GRBG")]
    InvalidCfaPattern(String),

    #[error("Invalid white balance: {0}")]
    InvalidWhiteBalance(String),

    #[error("Invalid levels: black={black}, white={white} (maximum {max})")]
    InvalidLevels { black: i64, white: i64, max: i64 },

    #[error("Failed to encode DNG image: {0}")]
    EncodeError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::InputReadError(_)
            | ConversionError::InvalidMagic(_)
            | ConversionError::MalformedHeader(_)
            | ConversionError::UnsupportedBitDepth(_)
            | ConversionError::InvalidDimensions(_, _)
            | ConversionError::TruncatedPayload { .. }
            | ConversionError::IoError(_) => ErrorKind::Decode,
            ConversionError::MissingParameter(_)
            | ConversionError::InvalidCfaPattern(_)
            | ConversionError::InvalidWhiteBalance(_)
            | ConversionError::InvalidLevels { .. } => ErrorKind::Configuration,
            ConversionError::EncodeError(_) | ConversionError::OutputWriteError(_) => {
                ErrorKind::Encoding
            }
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

impl From<tiff::TiffError> for ConversionError {
    fn from(err: tiff::TiffError) -> Self {
        ConversionError::EncodeError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
