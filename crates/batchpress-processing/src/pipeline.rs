//! Conversion pipeline: decode → resize onto canvas → encode.

use batchpress_core::{ConversionParams, ConvertError, ConvertResult, EncodedResult};
use image::GenericImageView;
use std::sync::Arc;

use crate::codec::{ImageCodec, NativeCodec};
use crate::resize::{Background, ImageResize};

/// Turns one source image plus [`ConversionParams`] into one [`EncodedResult`].
///
/// Stateless apart from the codec; safe to share across threads.
#[derive(Clone)]
pub struct ConversionPipeline {
    codec: Arc<dyn ImageCodec>,
}

impl ConversionPipeline {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &Arc<dyn ImageCodec> {
        &self.codec
    }

    pub fn convert(&self, source: &[u8], params: &ConversionParams) -> ConvertResult<EncodedResult> {
        params.validate()?;
        let spec = params.target_spec();

        let img = self.codec.decode(source)?;
        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = ImageResize::target_dimensions(
            orig_width,
            orig_height,
            params.width,
            params.height,
            params.lock_aspect_ratio,
        );

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            target = %params.target_format,
            "Resizing image"
        );

        let background = if spec.alpha_support {
            Background::Transparent
        } else {
            Background::White
        };
        let canvas = ImageResize::render_on_canvas(&img, width, height, background);

        let quality = params.normalized_quality();
        let payload = self.codec.encode(&canvas, params.target_format, quality)?;

        if payload.data.is_empty() {
            return Err(ConvertError::Encode(format!(
                "Encoder returned an empty result for {}",
                spec.mime_type
            )));
        }
        if !payload.mime_type.eq_ignore_ascii_case(spec.mime_type) {
            return Err(ConvertError::Encode(format!(
                "Encoder produced {} instead of {}",
                payload.mime_type, spec.mime_type
            )));
        }

        let byte_size = payload.data.len() as u64;
        let approximate_byte_size = estimate_encoded_size(&payload.data);

        tracing::debug!(
            byte_size,
            approximate_byte_size,
            quality,
            "Image encoded"
        );

        Ok(EncodedResult {
            payload: payload.data,
            byte_size,
            approximate_byte_size,
            width,
            height,
            file_extension: spec.extension,
            mime_type: spec.mime_type,
        })
    }
}

impl Default for ConversionPipeline {
    fn default() -> Self {
        Self::new(Arc::new(NativeCodec))
    }
}

/// Approximate payload size from the length of its base64 data URL body:
/// `round((len(dataUrl) - headerLength) * 3/4)`.
///
/// The body is `4 * ceil(n / 3)` characters, padding included, so this can
/// overshoot the real length by up to two bytes. Prefer the exact payload
/// length when it is available.
pub fn estimate_encoded_size(payload: &[u8]) -> u64 {
    let encoded_len = payload.len().div_ceil(3) * 4;
    (encoded_len as f64 * 3.0 / 4.0).round() as u64
}
