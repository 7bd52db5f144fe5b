//! Batchpress Image Processing Library
//!
//! This crate provides the per-image conversion pipeline, the codec seam it
//! runs on, encoder capability probing and input validation.

pub mod capabilities;
pub mod codec;
pub mod pipeline;
pub mod resize;
pub mod validator;

// Re-export commonly used types
pub use capabilities::{format_capabilities, probe_supported_formats, FormatCapability};
pub use codec::{EncodedPayload, ImageCodec, NativeCodec};
pub use pipeline::{estimate_encoded_size, ConversionPipeline};
pub use resize::{Background, ImageResize};
pub use validator::{detect_mime_type, InputFile, InputValidator, ValidationError};
