//! Batchpress Services
//!
//! Batch coordination, zip packaging and download handling built on top of
//! the conversion pipeline.

pub mod archive;
pub mod batch;
pub mod download;
pub mod hooks;

pub use archive::{create_zip_archive, ArchiveEntry};
pub use batch::{BatchCoordinator, EnqueueReport, ItemOutcome, RejectedFile};
pub use download::{save_download, Download, ZIP_MIME_TYPE};
pub use hooks::{NoOpObserver, QueueEvent, QueueObserver, TracingObserver};
