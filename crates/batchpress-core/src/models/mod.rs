//! Data model shared by the pipeline, the batch coordinator and front ends.

pub mod conversion;
pub mod queued_image;

pub use conversion::{data_url, ConversionParams, EncodedResult};
pub use queued_image::{output_file_name, ImageId, ItemStatus, QueuedImage};
