//! Error types module
//!
//! All per-item and per-operation failures of the conversion pipeline, the
//! batch coordinator and the packaging step are unified under [`ConvertError`].
//! None of them is fatal: callers report the error for the affected item and
//! keep going with the rest of the batch.

use std::io;

use crate::models::ImageId;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected input files
    Debug,
    /// Warning level - for per-item failures the user can retry
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for user-facing error reporting.
///
/// Lets a front end decide how to present an error without matching on
/// every variant.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "DECODE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the failed operation can be retried as-is
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Unsupported format: {name} ({mime_type})")]
    UnsupportedFormat { name: String, mime_type: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Image not found: {0}")]
    NotFound(ImageId),

    #[error("Image not converted yet: {0}")]
    NotConverted(ImageId),

    #[error("Packaging error: {0}")]
    Packaging(String),

    #[error("Invalid conversion parameters: {0}")]
    InvalidParams(String),

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Generic message shown for any per-item failure.
pub const RETRY_MESSAGE: &str = "Something went wrong while processing the image, please try again";

/// Static metadata for each variant: (error_code, recoverable, log_level).
fn convert_error_static_metadata(err: &ConvertError) -> (&'static str, bool, LogLevel) {
    match err {
        ConvertError::UnsupportedFormat { .. } => ("UNSUPPORTED_FORMAT", false, LogLevel::Debug),
        ConvertError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        ConvertError::Decode(_) => ("DECODE_ERROR", true, LogLevel::Warn),
        ConvertError::Encode(_) => ("ENCODE_ERROR", true, LogLevel::Warn),
        ConvertError::NotFound(_) => ("NOT_FOUND", false, LogLevel::Debug),
        ConvertError::NotConverted(_) => ("NOT_CONVERTED", true, LogLevel::Debug),
        ConvertError::Packaging(_) => ("PACKAGING_ERROR", true, LogLevel::Error),
        ConvertError::InvalidParams(_) => ("INVALID_PARAMS", false, LogLevel::Debug),
        ConvertError::Cancelled => ("CANCELLED", true, LogLevel::Debug),
        ConvertError::Io(_) => ("IO_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for ConvertError {
    fn error_code(&self) -> &'static str {
        convert_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        convert_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            ConvertError::UnsupportedFormat { name, .. } => format!(
                "{} is not a supported image. Supported formats: JPG, PNG, WebP, GIF, BMP, TIFF",
                name
            ),
            ConvertError::InvalidInput(msg) => msg.clone(),
            ConvertError::NotConverted(_) => "Please convert the image first".to_string(),
            ConvertError::InvalidParams(msg) => msg.clone(),
            ConvertError::Cancelled => "Conversion was cancelled".to_string(),
            _ => RETRY_MESSAGE.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        convert_error_static_metadata(self).2
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
