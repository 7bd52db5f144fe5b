//! Batch coordinator
//!
//! Owns the queue of images for one session, drives the conversion pipeline
//! over it one item at a time and produces downloads. All state lives in the
//! [`BatchCoordinator`] value; there is no global queue.

use batchpress_core::{
    BatchConfig, ConversionParams, ConvertError, ConvertResult, EncodedResult, ErrorMetadata,
    FormatId, ImageId, LogLevel, QueuedImage,
};
use batchpress_processing::{
    probe_supported_formats, ConversionPipeline, InputFile, InputValidator,
};
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::archive::{create_zip_archive, ArchiveEntry};
use crate::download::{Download, ZIP_MIME_TYPE};
use crate::hooks::{NoOpObserver, QueueEvent, QueueObserver};

/// An input file that was not queued
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub mime_type: String,
    pub error_code: &'static str,
    pub reason: String,
}

/// Result of [`BatchCoordinator::enqueue`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnqueueReport {
    pub accepted: Vec<ImageId>,
    pub rejected: Vec<RejectedFile>,
}

/// Per-item result of a batch run
#[derive(Debug)]
pub struct ItemOutcome {
    pub id: ImageId,
    pub name: String,
    pub result: ConvertResult<EncodedResult>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct BatchCoordinator {
    items: Vec<QueuedImage>,
    params: ConversionParams,
    supported_formats: BTreeSet<FormatId>,
    pipeline: Arc<ConversionPipeline>,
    validator: InputValidator,
    observer: Arc<dyn QueueObserver>,
    archive_name: String,
}

impl BatchCoordinator {
    /// Create a coordinator, probing the pipeline's codec for the formats it
    /// can encode.
    pub fn new(pipeline: ConversionPipeline, config: &BatchConfig) -> ConvertResult<Self> {
        let supported = probe_supported_formats(pipeline.codec().as_ref());
        Self::with_supported_formats(pipeline, config, supported)
    }

    /// Create a coordinator with an already probed set of formats
    pub fn with_supported_formats(
        pipeline: ConversionPipeline,
        config: &BatchConfig,
        supported_formats: BTreeSet<FormatId>,
    ) -> ConvertResult<Self> {
        let params = config.conversion_params();
        Self::check_params(&params, &supported_formats)?;

        Ok(Self {
            items: Vec::new(),
            params,
            supported_formats,
            pipeline: Arc::new(pipeline),
            validator: InputValidator::new(config.max_file_size_bytes),
            observer: Arc::new(NoOpObserver),
            archive_name: config.archive_name.clone(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn QueueObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn check_params(
        params: &ConversionParams,
        supported_formats: &BTreeSet<FormatId>,
    ) -> ConvertResult<()> {
        params.validate()?;
        if !supported_formats.contains(&params.target_format) {
            return Err(ConvertError::InvalidParams(format!(
                "Target format {} is not supported by this encoder",
                params.target_format
            )));
        }
        Ok(())
    }

    pub fn params(&self) -> &ConversionParams {
        &self.params
    }

    /// Replace the conversion settings used by subsequent conversions.
    /// Already completed items keep their results.
    pub fn set_params(&mut self, params: ConversionParams) -> ConvertResult<()> {
        Self::check_params(&params, &self.supported_formats)?;
        self.params = params;
        Ok(())
    }

    pub fn supported_formats(&self) -> &BTreeSet<FormatId> {
        &self.supported_formats
    }

    pub fn items(&self) -> &[QueuedImage] {
        &self.items
    }

    pub fn get(&self, id: ImageId) -> Option<&QueuedImage> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_completed()).count()
    }

    /// True when the queue is non-empty and every item is completed.
    ///
    /// An empty queue returns `false` even though "every item is completed"
    /// holds vacuously for it: there is nothing to download.
    pub fn all_completed(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(QueuedImage::is_completed)
    }

    /// Append the recognized files as pending items. Unrecognized ones are
    /// collected in the report; existing items are never touched.
    pub fn enqueue(&mut self, files: impl IntoIterator<Item = InputFile>) -> EnqueueReport {
        let mut report = EnqueueReport::default();

        for file in files {
            match self.validator.check(&file) {
                Ok(format) => {
                    let item = QueuedImage::new(file.name, format, file.bytes);
                    report.accepted.push(item.id());
                    self.items.push(item);
                }
                Err(e) => {
                    let err = ConvertError::from(e);
                    report.rejected.push(RejectedFile {
                        name: file.name,
                        mime_type: file.mime_type,
                        error_code: err.error_code(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if !report.rejected.is_empty() {
            self.observer.on_event(&QueueEvent::Rejected {
                files: report.rejected.clone(),
            });
        }
        if !report.accepted.is_empty() {
            self.observer.on_event(&QueueEvent::Enqueued {
                ids: report.accepted.clone(),
            });
        }

        report
    }

    /// Convert a single item with the current settings.
    ///
    /// A completed item returns its existing result without running the
    /// pipeline again. On failure the item stays pending and can be retried.
    pub async fn convert_one(&mut self, id: ImageId) -> ConvertResult<EncodedResult> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(ConvertError::NotFound(id))?;

        if let Some(result) = self.items[index].result() {
            return Ok(result.clone());
        }

        self.observer.on_event(&QueueEvent::Started { id });

        let source = self.items[index].source().clone();
        let pipeline = Arc::clone(&self.pipeline);
        let params = self.params;

        // Decoding and encoding are CPU-bound; run off the async pool.
        let outcome = tokio::task::spawn_blocking(move || pipeline.convert(&source, &params))
            .await
            .unwrap_or_else(|e| Err(ConvertError::Encode(format!("Conversion task failed: {}", e))));

        match outcome {
            Ok(result) => {
                let byte_size = result.byte_size;
                self.items[index].complete(result.clone()).map_err(|_| {
                    ConvertError::InvalidInput(format!("Image {} was already converted", id))
                })?;
                self.observer
                    .on_event(&QueueEvent::Completed { id, byte_size });
                Ok(result)
            }
            Err(e) => {
                match e.log_level() {
                    LogLevel::Error => tracing::error!(image_id = %id, error = %e, "Conversion failed"),
                    LogLevel::Warn => tracing::warn!(image_id = %id, error = %e, "Conversion failed"),
                    LogLevel::Debug => tracing::debug!(image_id = %id, error = %e, "Conversion failed"),
                }
                self.observer.on_event(&QueueEvent::failed(id, &e));
                Err(e)
            }
        }
    }

    /// Convert every pending item, one at a time in queue order. A failing
    /// item does not stop the batch.
    pub async fn convert_all(&mut self) -> Vec<ItemOutcome> {
        self.convert_all_until(&CancellationToken::new()).await
    }

    /// Like [`convert_all`](Self::convert_all), but checks `cancel` before
    /// each item. The item in flight always finishes; the rest are reported
    /// as cancelled and stay pending.
    pub async fn convert_all_until(&mut self, cancel: &CancellationToken) -> Vec<ItemOutcome> {
        let pending: Vec<(ImageId, String)> = self
            .items
            .iter()
            .filter(|item| !item.is_completed())
            .map(|item| (item.id(), item.display_name().to_string()))
            .collect();

        tracing::info!(count = pending.len(), "Converting batch");

        let mut outcomes = Vec::with_capacity(pending.len());
        for (id, name) in pending {
            let result = if cancel.is_cancelled() {
                Err(ConvertError::Cancelled)
            } else {
                self.convert_one(id).await
            };
            outcomes.push(ItemOutcome { id, name, result });
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(
            converted = outcomes.len() - failed,
            failed,
            "Batch finished"
        );

        outcomes
    }

    /// The converted payload of one item, named `<base>_compressed.<ext>`
    pub fn download_one(&self, id: ImageId) -> ConvertResult<Download> {
        let item = self.get(id).ok_or(ConvertError::NotFound(id))?;
        let result = item.result().ok_or(ConvertError::NotConverted(id))?;
        let file_name = item
            .output_file_name()
            .ok_or(ConvertError::NotConverted(id))?;

        Ok(Download {
            file_name,
            mime_type: result.mime_type.to_string(),
            data: result.payload.clone(),
        })
    }

    /// Zip archive of every completed item. Nothing in the queue changes, so
    /// a failed packaging can simply be retried.
    pub async fn download_all(&self) -> ConvertResult<Download> {
        let entries: Vec<ArchiveEntry> = self
            .items
            .iter()
            .filter_map(|item| {
                let result = item.result()?;
                let file_name = item.output_file_name()?;
                Some(ArchiveEntry::new(file_name, result.payload.clone()))
            })
            .collect();

        if entries.is_empty() {
            return Err(ConvertError::Packaging(
                "No converted images to package".to_string(),
            ));
        }

        let archive = tokio::task::spawn_blocking(move || create_zip_archive(&entries))
            .await
            .map_err(|e| ConvertError::Packaging(format!("Packaging task failed: {}", e)))??;

        Ok(Download {
            file_name: self.archive_name.clone(),
            mime_type: ZIP_MIME_TYPE.to_string(),
            data: Bytes::from(archive),
        })
    }
}
