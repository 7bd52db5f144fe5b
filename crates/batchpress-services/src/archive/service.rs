use batchpress_core::{ConvertError, ConvertResult};
use bytes::Bytes;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// DEFLATE level used for every archive entry
const COMPRESSION_LEVEL: i32 = 9;

/// One file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub data: Bytes,
}

impl ArchiveEntry {
    pub fn new(file_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }
}

/// Sanitize filename for archive entry to prevent path traversal.
/// Extracts only the base name (strips path components like `../`).
fn sanitize_archive_filename(filename: &str, fallback: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Make `name` unique among `taken` by appending ` (n)` before the extension
fn unique_entry_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&name)
        .to_string();
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_string);

    let mut counter = 2;
    loop {
        let candidate = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext),
            None => format!("{} ({})", stem, counter),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Create a ZIP archive (DEFLATE, maximum compression) from in-memory entries
pub fn create_zip_archive(entries: &[ArchiveEntry]) -> ConvertResult<Vec<u8>> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .unix_permissions(0o644);

        let mut taken = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            let safe_filename = unique_entry_name(
                sanitize_archive_filename(&entry.file_name, &format!("image_{}", index + 1)),
                &mut taken,
            );

            zip.start_file(safe_filename.as_str(), options).map_err(|e| {
                ConvertError::Packaging(format!("Failed to add {} to ZIP: {}", safe_filename, e))
            })?;
            zip.write_all(&entry.data).map_err(|e| {
                ConvertError::Packaging(format!(
                    "Failed to write {} to ZIP: {}",
                    safe_filename, e
                ))
            })?;
        }

        zip.finish()
            .map_err(|e| ConvertError::Packaging(format!("Failed to finalize ZIP archive: {}", e)))?;
    }

    tracing::debug!(entries = entries.len(), size = buffer.len(), "ZIP archive created");

    Ok(buffer)
}
