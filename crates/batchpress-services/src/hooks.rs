//! Queue change notifications
//!
//! The coordinator does not render anything. Front ends that display the
//! queue implement [`QueueObserver`] and re-render on every event.

use batchpress_core::{ErrorMetadata, ImageId};

use crate::batch::RejectedFile;

/// A mutation of the batch queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// New pending items were appended
    Enqueued { ids: Vec<ImageId> },
    /// Input files were refused and not queued
    Rejected { files: Vec<RejectedFile> },
    /// A conversion is in progress
    Started { id: ImageId },
    /// An item transitioned to completed
    Completed { id: ImageId, byte_size: u64 },
    /// A conversion failed; the item stays pending
    Failed {
        id: ImageId,
        error_code: &'static str,
        message: String,
    },
}

impl QueueEvent {
    pub(crate) fn failed(id: ImageId, err: &batchpress_core::ConvertError) -> Self {
        QueueEvent::Failed {
            id,
            error_code: err.error_code(),
            message: err.to_string(),
        }
    }
}

/// Receives every queue mutation, in order
pub trait QueueObserver: Send + Sync {
    fn on_event(&self, event: &QueueEvent);
}

/// No-op implementation for headless use
pub struct NoOpObserver;

impl QueueObserver for NoOpObserver {
    fn on_event(&self, _event: &QueueEvent) {}
}

/// Logs queue events through `tracing`
pub struct TracingObserver;

impl QueueObserver for TracingObserver {
    fn on_event(&self, event: &QueueEvent) {
        match event {
            QueueEvent::Enqueued { ids } => {
                tracing::info!(count = ids.len(), "Images queued");
            }
            QueueEvent::Rejected { files } => {
                for file in files {
                    tracing::warn!(
                        name = %file.name,
                        mime_type = %file.mime_type,
                        reason = %file.reason,
                        "Unsupported file skipped"
                    );
                }
            }
            QueueEvent::Started { id } => {
                tracing::debug!(image_id = %id, "Converting image");
            }
            QueueEvent::Completed { id, byte_size } => {
                tracing::info!(image_id = %id, byte_size, "Image converted");
            }
            QueueEvent::Failed {
                id,
                error_code,
                message,
            } => {
                tracing::warn!(image_id = %id, error_code, error = %message, "Image conversion failed");
            }
        }
    }
}
