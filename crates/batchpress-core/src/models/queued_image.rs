use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use uuid::Uuid;

use super::conversion::{data_url, EncodedResult};
use crate::formats::FormatId;

/// Session-unique identifier of a queued image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ImageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Completed,
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One user-submitted image awaiting or having completed conversion.
///
/// `result` is present exactly when `status` is `Completed`; the only way to
/// get there is [`QueuedImage::complete`], which succeeds once.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedImage {
    id: ImageId,
    display_name: String,
    original_format: FormatId,
    #[serde(skip)]
    source: Bytes,
    status: ItemStatus,
    result: Option<EncodedResult>,
}

impl QueuedImage {
    pub fn new(display_name: impl Into<String>, original_format: FormatId, source: Bytes) -> Self {
        Self {
            id: ImageId::new(),
            display_name: display_name.into(),
            original_format,
            source,
            status: ItemStatus::Pending,
            result: None,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original_format(&self) -> FormatId {
        self.original_format
    }

    pub fn source(&self) -> &Bytes {
        &self.source
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }

    pub fn result(&self) -> Option<&EncodedResult> {
        self.result.as_ref()
    }

    /// Size of the source file in bytes
    pub fn original_size(&self) -> u64 {
        self.source.len() as u64
    }

    /// Source image as a data URL, for thumbnails
    pub fn preview_data_url(&self) -> String {
        data_url(self.original_format.mime_type(), &self.source)
    }

    /// Download name of the converted image, `None` while pending
    pub fn output_file_name(&self) -> Option<String> {
        self.result
            .as_ref()
            .map(|result| output_file_name(&self.display_name, result.file_extension))
    }

    /// Record the conversion result. Returns the result back if the item was
    /// already completed.
    pub fn complete(&mut self, result: EncodedResult) -> Result<(), EncodedResult> {
        if self.is_completed() {
            return Err(result);
        }
        self.result = Some(result);
        self.status = ItemStatus::Completed;
        Ok(())
    }
}

/// `<original-base-name>_compressed.<extension>`, with any directory
/// components and the last extension of `display_name` removed.
pub fn output_file_name(display_name: &str, extension: &str) -> String {
    let stem = Path::new(display_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "..")
        .unwrap_or("image");
    format!("{}_compressed.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> EncodedResult {
        EncodedResult {
            payload: Bytes::from_static(b"png-bytes"),
            byte_size: 9,
            approximate_byte_size: 9,
            width: 4,
            height: 3,
            file_extension: "png",
            mime_type: "image/png",
        }
    }

    #[test]
    fn test_new_item_is_pending_without_result() {
        let item = QueuedImage::new("cat.jpg", FormatId::Jpeg, Bytes::from_static(b"jpeg"));
        assert_eq!(item.status(), ItemStatus::Pending);
        assert!(item.result().is_none());
        assert!(item.output_file_name().is_none());
        assert_eq!(item.original_size(), 4);
    }

    #[test]
    fn test_complete_sets_status_and_result_together() {
        let mut item = QueuedImage::new("cat.jpg", FormatId::Jpeg, Bytes::from_static(b"jpeg"));
        item.complete(sample_result()).unwrap();
        assert!(item.is_completed());
        assert_eq!(item.result(), Some(&sample_result()));
        assert_eq!(item.output_file_name().as_deref(), Some("cat_compressed.png"));
    }

    #[test]
    fn test_complete_happens_once() {
        let mut item = QueuedImage::new("cat.jpg", FormatId::Jpeg, Bytes::from_static(b"jpeg"));
        item.complete(sample_result()).unwrap();

        let mut second = sample_result();
        second.byte_size = 1;
        assert!(item.complete(second).is_err());
        assert_eq!(item.result().map(|r| r.byte_size), Some(9));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = QueuedImage::new("a.png", FormatId::Png, Bytes::new());
        let b = QueuedImage::new("a.png", FormatId::Png, Bytes::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("photo.jpeg", "webp"), "photo_compressed.webp");
        assert_eq!(output_file_name("archive.tar.gz", "png"), "archive.tar_compressed.png");
        assert_eq!(output_file_name("noext", "jpg"), "noext_compressed.jpg");
        assert_eq!(output_file_name("../../etc/passwd.png", "bmp"), "passwd_compressed.bmp");
        assert_eq!(output_file_name("", "gif"), "image_compressed.gif");
    }

    #[test]
    fn test_preview_data_url() {
        let item = QueuedImage::new("a.png", FormatId::Png, Bytes::from_static(b"abc"));
        assert_eq!(item.preview_data_url(), "data:image/png;base64,YWJj");
    }
}
