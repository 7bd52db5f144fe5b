//! Download blobs and the save step that hands them to the user

use batchpress_core::{ConvertError, ConvertResult};
use bytes::Bytes;
use std::path::{Path, PathBuf};

pub const ZIP_MIME_TYPE: &str = "application/zip";

/// A blob ready to be saved under a suggested name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Write `download` into `dir` under its suggested name, creating the
/// directory when needed. Returns the written path.
pub async fn save_download(dir: &Path, download: &Download) -> ConvertResult<PathBuf> {
    let file_name = Path::new(&download.file_name)
        .file_name()
        .ok_or_else(|| {
            ConvertError::InvalidInput(format!("Invalid download name: {}", download.file_name))
        })?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, &download.data).await?;

    tracing::info!(
        path = %path.display(),
        size = download.data.len(),
        "Download saved"
    );

    Ok(path)
}
