use batchpress_core::{ConvertError, FormatId};
use bytes::Bytes;
use std::path::Path;

/// A file handed over by the input collaborator (file picker, drag and
/// drop, command line)
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Build an input from raw bytes, deriving the MIME type from the
    /// content and falling back to the file extension.
    pub fn detect(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        let mime_type = detect_mime_type(&name, &bytes);
        Self {
            name,
            mime_type,
            bytes,
        }
    }
}

/// Common validation errors for input files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type}")]
    InvalidContentType { name: String, content_type: String },

    #[error("Empty file: {0}")]
    EmptyFile(String),
}

impl From<ValidationError> for ConvertError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidContentType { name, content_type } => {
                ConvertError::UnsupportedFormat {
                    name,
                    mime_type: content_type,
                }
            }
            other => ConvertError::InvalidInput(other.to_string()),
        }
    }
}

/// Input file validator
///
/// Only the six registry MIME types are accepted.
pub struct InputValidator {
    max_file_size: usize,
}

impl InputValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate file size
    pub fn validate_file_size(&self, name: &str, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile(name.to_string()));
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type against the format registry
    pub fn validate_content_type(
        &self,
        name: &str,
        content_type: &str,
    ) -> Result<FormatId, ValidationError> {
        FormatId::from_mime(content_type).ok_or_else(|| ValidationError::InvalidContentType {
            name: name.to_string(),
            content_type: content_type.to_string(),
        })
    }

    /// Validate all aspects of a file and return its registry format
    pub fn check(&self, file: &InputFile) -> Result<FormatId, ValidationError> {
        let format = self.validate_content_type(&file.name, &file.mime_type)?;
        self.validate_file_size(&file.name, file.bytes.len())?;
        Ok(format)
    }
}

/// MIME type of `data`, sniffed from magic bytes. Unknown content falls back
/// to the extension of `name`, then to `application/octet-stream`.
pub fn detect_mime_type(name: &str, data: &[u8]) -> String {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type().to_string();
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "ico" => "image/x-icon".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "avif" => "image/avif".to_string(),
        other => FormatId::from_extension(other)
            .map(|format| format.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_accepts_registry_types() {
        let validator = InputValidator::new(1024);
        for format in FormatId::all() {
            let file = InputFile::new("a", format.mime_type(), vec![1u8; 10]);
            assert_eq!(validator.check(&file).unwrap(), format);
        }
    }

    #[test]
    fn test_rejects_icon() {
        let validator = InputValidator::new(1024);
        let file = InputFile::new("favicon.ico", "image/x-icon", vec![0u8; 10]);
        let err = validator.check(&file).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidContentType { .. }));

        let converted: ConvertError = err.into();
        assert!(matches!(
            converted,
            ConvertError::UnsupportedFormat { ref name, ref mime_type }
                if name == "favicon.ico" && mime_type == "image/x-icon"
        ));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let validator = InputValidator::new(4);
        let empty = InputFile::new("a.png", "image/png", Vec::new());
        assert!(matches!(
            validator.check(&empty),
            Err(ValidationError::EmptyFile(_))
        ));

        let big = InputFile::new("a.png", "image/png", vec![0u8; 5]);
        assert!(matches!(
            validator.check(&big),
            Err(ValidationError::FileTooLarge { size: 5, max: 4 })
        ));
    }

    #[test]
    fn test_detect_mime_type_prefers_content() {
        // PNG content with a misleading extension
        assert_eq!(detect_mime_type("photo.jpg", &png_bytes()), "image/png");
    }

    #[test]
    fn test_detect_mime_type_falls_back_to_extension() {
        assert_eq!(detect_mime_type("favicon.ico", b"??"), "image/x-icon");
        assert_eq!(detect_mime_type("scan.TIF", b"??"), "image/tiff");
        assert_eq!(detect_mime_type("notes.txt", b"hello"), "application/octet-stream");
    }
}
