use std::fmt;
use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Represents a request that carries neither a watermark text nor a watermark image
    #[error("No watermark text or image was provided")]
    NoWatermark,

    /// Represents a payload that does not fit into the channels of the background image
    #[error(
        "Capacity Error: the payload needs {required} channel values but the background image only offers {available}"
    )]
    PixelsNotEnough { required: usize, available: usize },

    /// Represents a transform request for a length the transform cannot handle, e.g. 0
    #[error("Transform length {0} is not supported, the length must be at least 1")]
    UnsupportedTransformLength(usize),

    /// Represents a buffer handed to a transform plan made for another length
    #[error("Transform plan expects {expected} values but the buffer holds {actual}")]
    TransformLengthMismatch { expected: usize, actual: usize },

    /// Represents a channel array that can not be split into whole pixels
    #[error("Channel array of length {0} is not a multiple of 4")]
    MalformedChannels(usize),

    /// Represents a pixel buffer whose pixel count does not match its dimensions
    #[error("Pixel buffer of {width}x{height} can not hold {len} pixels")]
    InvalidPixelBuffer { width: u32, height: u32, len: usize },

    /// Represents a bit string with characters other than '0' and '1' or a broken length
    #[error("Invalid binary string: {0}")]
    InvalidBinaryString(String),

    /// Represents a framed bit string that matches none of the known tag pairs
    #[error("Bit string is not framed by any known prefix and suffix")]
    UnknownFraming,

    /// Represents the error of invalid UTF-8 text data found inside of a payload
    #[error("Invalid text data found inside a payload")]
    InvalidTextData(#[from] FromUtf8Error),

    /// Represents an invalid image media. For example, a broken PNG file
    #[error("Image media is invalid")]
    InvalidImageMedia,

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    /// Represents text that was supposed to be a base64 encoded image
    #[error("Watermark image text is not valid base64")]
    Base64Decode(#[from] base64::DecodeError),

    /// Represents a configuration that the pipeline can not run with
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Represents a task that was cancelled before all chunks were processed
    #[error("Watermark task was cancelled")]
    Cancelled,

    /// Represents a worker thread that went away without reporting a result
    #[error("Watermark worker terminated without a result")]
    WorkerFailed,

    #[error("No background image set")]
    BackgroundNotSet,

    #[error("No target file set")]
    TargetNotSet,

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl WatermarkError {
    /// The kind reported to a [`BuildFinishListener`](crate::task::BuildFinishListener).
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            WatermarkError::NoWatermark => FailureKind::NoWatermark,
            WatermarkError::PixelsNotEnough { .. } => FailureKind::PixelsNotEnough,
            _ => FailureKind::CreateFailed,
        }
    }
}

/// The three terminal failures a watermark task can report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Neither text nor image was given. Retry with a watermark.
    NoWatermark,
    /// The payload is larger than the background image can carry.
    PixelsNotEnough,
    /// No output image was produced for any other reason.
    CreateFailed,
}

impl FailureKind {
    /// Stable error code, usable in logs and across FFI boundaries.
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::NoWatermark => "ERROR_NO_WATERMARKS",
            FailureKind::PixelsNotEnough => "ERROR_PIXELS_NOT_ENOUGH",
            FailureKind::CreateFailed => "ERROR_CREATE_FAILED",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FailureKind::NoWatermark => "no watermark text or image was provided",
            FailureKind::PixelsNotEnough => "the background image is too small for the watermark",
            FailureKind::CreateFailed => "the watermarked image could not be created",
        };
        write!(f, "{msg}")
    }
}
