//! Image codec seam
//!
//! The pipeline only needs two capabilities from its environment: decode raw
//! bytes into pixels, and encode pixels into a target format. [`ImageCodec`]
//! is that boundary; [`NativeCodec`] implements it with `image`, `mozjpeg`
//! and `webp`.

use batchpress_core::{ConvertError, ConvertResult, FormatId};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Encoder output together with the MIME type the encoder declares for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: Bytes,
    pub mime_type: String,
}

impl EncodedPayload {
    pub fn new(data: impl Into<Bytes>, format: FormatId) -> Self {
        Self {
            data: data.into(),
            mime_type: format.mime_type().to_string(),
        }
    }
}

/// Decode and encode capabilities supplied by the environment
pub trait ImageCodec: Send + Sync {
    /// Decode raw bytes, sniffing the format from content
    fn decode(&self, data: &[u8]) -> ConvertResult<DynamicImage>;

    /// Encode `image` as `format`. `quality` is in [0, 1]; encoders without a
    /// quality parameter ignore it.
    fn encode(
        &self,
        image: &DynamicImage,
        format: FormatId,
        quality: f32,
    ) -> ConvertResult<EncodedPayload>;
}

/// Largest width or height libjpeg accepts
pub const JPEG_MAX_DIMENSION: u32 = 65_500;

/// Codec backed by the `image` crate, with mozjpeg for JPEG and libwebp for
/// lossy WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl ImageCodec for NativeCodec {
    fn decode(&self, data: &[u8]) -> ConvertResult<DynamicImage> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ConvertError::Decode(e.to_string()))?;
        if reader.format().is_none() {
            return Err(ConvertError::Decode(
                "Unrecognized image data".to_string(),
            ));
        }
        reader
            .decode()
            .map_err(|e| ConvertError::Decode(e.to_string()))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: FormatId,
        quality: f32,
    ) -> ConvertResult<EncodedPayload> {
        let data = match format {
            FormatId::Jpeg => Self::encode_jpeg(image, quality)?,
            FormatId::WebP => Self::encode_webp(image, quality)?,
            FormatId::Png => Self::write_with_image(image, ImageFormat::Png)?,
            FormatId::Gif => Self::write_with_image(image, ImageFormat::Gif)?,
            FormatId::Bmp => {
                Self::write_with_image(&DynamicImage::ImageRgb8(image.to_rgb8()), ImageFormat::Bmp)?
            }
            // The TIFF encoder has no lossy mode; quality is accepted and ignored
            FormatId::Tiff => {
                Self::write_with_image(&DynamicImage::ImageRgb8(image.to_rgb8()), ImageFormat::Tiff)?
            }
        };

        Ok(EncodedPayload::new(data, format))
    }
}

impl NativeCodec {
    /// Compress to JPEG using mozjpeg
    fn encode_jpeg(image: &DynamicImage, quality: f32) -> ConvertResult<Bytes> {
        let (width, height) = (image.width(), image.height());
        // libjpeg errors unwind through mozjpeg, so reject what it would refuse
        if width > JPEG_MAX_DIMENSION || height > JPEG_MAX_DIMENSION {
            return Err(ConvertError::Encode(format!(
                "JPEG dimensions {}x{} exceed the {} px limit",
                width, height, JPEG_MAX_DIMENSION
            )));
        }

        let rgb_img = image.to_rgb8();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality((quality * 100.0).clamp(1.0, 100.0));
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| ConvertError::Encode(format!("JPEG encoder failed to start: {}", e)))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| ConvertError::Encode(format!("JPEG encoder failed: {}", e)))?;
        let jpeg_data = comp
            .finish()
            .map_err(|e| ConvertError::Encode(format!("JPEG encoder failed to finish: {}", e)))?;

        Ok(Bytes::from(jpeg_data))
    }

    /// Compress to lossy WebP
    fn encode_webp(image: &DynamicImage, quality: f32) -> ConvertResult<Bytes> {
        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let encoder = webp::Encoder::from_rgb(&rgb_img, width, height);
        let webp_data = encoder
            .encode_simple(false, (quality * 100.0).clamp(0.0, 100.0))
            .map_err(|e| ConvertError::Encode(format!("WebP encoder failed: {:?}", e)))?;

        Ok(Bytes::copy_from_slice(&webp_data))
    }

    fn write_with_image(image: &DynamicImage, format: ImageFormat) -> ConvertResult<Bytes> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        image
            .write_to(&mut cursor, format)
            .map_err(|e| ConvertError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([200, 30, 30, 255])))
    }

    #[test]
    fn test_encode_every_format_round_trips_through_decode() {
        let codec = NativeCodec;
        for format in FormatId::all() {
            let payload = codec.encode(&test_image(), format, 0.8).unwrap();
            assert!(!payload.data.is_empty(), "{} produced no data", format);
            assert_eq!(payload.mime_type, format.mime_type());

            let decoded = codec.decode(&payload.data).unwrap();
            assert_eq!(decoded.dimensions(), (8, 6), "{} changed dimensions", format);
        }
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let codec = NativeCodec;
        let result = codec.decode(b"definitely not an image");
        assert!(matches!(result, Err(ConvertError::Decode(_))));
    }

    #[test]
    fn test_decode_truncated_png_is_decode_error() {
        let codec = NativeCodec;
        let payload = codec.encode(&test_image(), FormatId::Png, 1.0).unwrap();
        let truncated = &payload.data[..payload.data.len() / 2];
        assert!(matches!(codec.decode(truncated), Err(ConvertError::Decode(_))));
    }

    #[test]
    fn test_jpeg_quality_changes_output_size() {
        let codec = NativeCodec;
        let mut noisy = RgbaImage::new(64, 64);
        for (x, y, pixel) in noisy.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 7 % 255) as u8, (y * 13 % 255) as u8, ((x ^ y) * 5 % 255) as u8, 255]);
        }
        let noisy = DynamicImage::ImageRgba8(noisy);

        let low = codec.encode(&noisy, FormatId::Jpeg, 0.1).unwrap();
        let high = codec.encode(&noisy, FormatId::Jpeg, 0.95).unwrap();
        assert!(low.data.len() < high.data.len());
    }

    #[test]
    fn test_jpeg_over_dimension_limit_is_encode_error() {
        let wide = DynamicImage::ImageRgba8(RgbaImage::new(JPEG_MAX_DIMENSION + 1, 2));
        let result = NativeCodec.encode(&wide, FormatId::Jpeg, 0.8);
        assert!(matches!(result, Err(ConvertError::Encode(_))));

        let edge = DynamicImage::ImageRgba8(RgbaImage::new(JPEG_MAX_DIMENSION, 1));
        assert!(NativeCodec.encode(&edge, FormatId::Jpeg, 0.8).is_ok());
    }
}
