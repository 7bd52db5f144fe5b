//! Encoder capability probing
//!
//! Run once at start-up to find out which registry formats the codec can
//! actually produce. Formats that fail the probe are hidden from selection.

use batchpress_core::FormatId;
use image::{DynamicImage, Rgba, RgbaImage};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::codec::ImageCodec;

/// Registry entry as offered to a format selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatCapability {
    pub format: FormatId,
    pub extension: &'static str,
    pub quality_support: bool,
    pub description: &'static str,
    pub available: bool,
}

/// Encode a 1x1 image in every registry format and keep those whose output
/// is non-empty and declares the requested MIME type.
pub fn probe_supported_formats(codec: &dyn ImageCodec) -> BTreeSet<FormatId> {
    let probe = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])));

    FormatId::all()
        .into_iter()
        .filter(|&format| match codec.encode(&probe, format, 1.0) {
            Ok(payload) if payload.data.is_empty() => {
                tracing::warn!(format = %format, "Encoder returned no data, disabling format");
                false
            }
            Ok(payload) if !payload.mime_type.eq_ignore_ascii_case(format.mime_type()) => {
                tracing::warn!(
                    format = %format,
                    declared = %payload.mime_type,
                    "Encoder fell back to another format, disabling format"
                );
                false
            }
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(format = %format, error = %e, "Encoder probe failed, disabling format");
                false
            }
        })
        .collect()
}

/// Full registry annotated with probe results, in registry order
pub fn format_capabilities(supported: &BTreeSet<FormatId>) -> Vec<FormatCapability> {
    FormatId::all()
        .into_iter()
        .map(|format| {
            let spec = format.spec();
            FormatCapability {
                format,
                extension: spec.extension,
                quality_support: spec.quality_support,
                description: spec.description,
                available: supported.contains(&format),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{EncodedPayload, NativeCodec};
    use batchpress_core::{ConvertError, ConvertResult};
    use bytes::Bytes;

    /// Encoder that only knows PNG and answers everything else with PNG,
    /// except GIF which errors and BMP which returns nothing
    struct PngOnlyCodec;

    impl ImageCodec for PngOnlyCodec {
        fn decode(&self, data: &[u8]) -> ConvertResult<DynamicImage> {
            NativeCodec.decode(data)
        }

        fn encode(
            &self,
            image: &DynamicImage,
            format: FormatId,
            quality: f32,
        ) -> ConvertResult<EncodedPayload> {
            match format {
                FormatId::Gif => Err(ConvertError::Encode("no gif".to_string())),
                FormatId::Bmp => Ok(EncodedPayload::new(Bytes::new(), format)),
                _ => NativeCodec.encode(image, FormatId::Png, quality),
            }
        }
    }

    #[test]
    fn test_native_codec_supports_all_formats() {
        let supported = probe_supported_formats(&NativeCodec);
        assert_eq!(supported.len(), 6);
    }

    #[test]
    fn test_probe_drops_failing_formats() {
        let supported = probe_supported_formats(&PngOnlyCodec);
        assert_eq!(supported.into_iter().collect::<Vec<_>>(), vec![FormatId::Png]);
    }

    #[test]
    fn test_format_capabilities_marks_availability() {
        let supported: BTreeSet<FormatId> = [FormatId::Png, FormatId::Jpeg].into_iter().collect();
        let caps = format_capabilities(&supported);
        assert_eq!(caps.len(), 6);
        assert!(caps[0].available); // jpeg
        assert!(caps[1].available); // png
        assert!(!caps[2].available); // webp
        assert_eq!(caps[2].extension, "webp");
    }
}
