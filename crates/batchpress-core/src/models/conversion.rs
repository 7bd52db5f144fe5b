use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::formats::{FormatId, FormatSpec};

/// Target settings applied uniformly to every conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionParams {
    pub target_format: FormatId,
    pub width: u32,
    pub height: u32,
    pub lock_aspect_ratio: bool,
    /// 0-100, only used when the target format supports lossy quality
    pub quality: u8,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            target_format: FormatId::Jpeg,
            width: 1920,
            height: 1080,
            lock_aspect_ratio: true,
            quality: 80,
        }
    }
}

impl ConversionParams {
    pub fn validate(&self) -> ConvertResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConvertError::InvalidParams(format!(
                "Width and height must be greater than zero (got {}x{})",
                self.width, self.height
            )));
        }
        if self.quality > 100 {
            return Err(ConvertError::InvalidParams(format!(
                "Quality must be between 0 and 100 (got {})",
                self.quality
            )));
        }
        Ok(())
    }

    pub fn target_spec(&self) -> &'static FormatSpec {
        self.target_format.spec()
    }

    /// Quality in [0, 1] as handed to the encoder. Formats without lossy
    /// quality support always get 1.0.
    pub fn normalized_quality(&self) -> f32 {
        if self.target_spec().quality_support {
            f32::from(self.quality.min(100)) / 100.0
        } else {
            1.0
        }
    }
}

/// Output of one successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedResult {
    #[serde(skip)]
    pub payload: Bytes,
    /// Exact payload length
    pub byte_size: u64,
    /// Estimate derived from the base64 data URL length
    pub approximate_byte_size: u64,
    pub width: u32,
    pub height: u32,
    pub file_extension: &'static str,
    pub mime_type: &'static str,
}

impl EncodedResult {
    pub fn to_data_url(&self) -> String {
        data_url(self.mime_type, &self.payload)
    }
}

/// Render bytes as a `data:<mime>;base64,<payload>` URL
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(ConversionParams::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let params = ConversionParams {
            width: 0,
            ..ConversionParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConvertError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_validate_rejects_quality_above_100() {
        let params = ConversionParams {
            quality: 101,
            ..ConversionParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_normalized_quality() {
        let jpeg = ConversionParams {
            target_format: FormatId::Jpeg,
            quality: 80,
            ..ConversionParams::default()
        };
        assert!((jpeg.normalized_quality() - 0.8).abs() < f32::EPSILON);

        // PNG has no quality parameter, the slider value is ignored
        let png = ConversionParams {
            target_format: FormatId::Png,
            quality: 30,
            ..ConversionParams::default()
        };
        assert_eq!(png.normalized_quality(), 1.0);
    }

    #[test]
    fn test_data_url() {
        let url = data_url("image/png", b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");
        assert_eq!(data_url("image/jpeg", b""), "data:image/jpeg;base64,");
    }
}
