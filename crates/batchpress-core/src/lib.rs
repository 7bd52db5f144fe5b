//! Batchpress Core Library
//!
//! This crate provides the data model, format registry, error types and
//! configuration shared by all batchpress components.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;

// Re-export commonly used types
pub use config::BatchConfig;
pub use error::{ConvertError, ConvertResult, ErrorMetadata, LogLevel, RETRY_MESSAGE};
pub use formats::{FormatId, FormatSpec};
pub use models::{
    output_file_name, ConversionParams, EncodedResult, ImageId, ItemStatus, QueuedImage,
};
