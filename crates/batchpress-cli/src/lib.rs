use batchpress_core::{BatchConfig, ErrorMetadata, FormatId};
use batchpress_services::{save_download, BatchCoordinator, EnqueueReport, ItemOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Settings given on the command line; `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub format: Option<FormatId>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lock_aspect_ratio: Option<bool>,
    pub quality: Option<u8>,
    pub output_dir: Option<PathBuf>,
}

/// Apply command-line overrides on top of the environment configuration.
pub fn apply_overrides(mut config: BatchConfig, overrides: &Overrides) -> BatchConfig {
    if let Some(format) = overrides.format {
        config.target_format = format;
    }
    if let Some(width) = overrides.width {
        config.width = width;
    }
    if let Some(height) = overrides.height {
        config.height = height;
    }
    if let Some(lock) = overrides.lock_aspect_ratio {
        config.lock_aspect_ratio = lock;
    }
    if let Some(quality) = overrides.quality {
        config.quality = quality;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output_dir = dir.clone();
    }
    config
}

/// Human readable byte size, e.g. "1.5 MB".
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[derive(Debug, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub status: &'static str,
    pub original_size: Option<String>,
    pub output_size: Option<String>,
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_error: Option<String>,
    pub items: Vec<ItemSummary>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.rejected > 0 || self.archive_error.is_some()
    }
}

/// Save converted images into `output_dir`, one file each or a single
/// archive when `zip` is set, and summarize the run.
///
/// A failed save is reported on its item; the remaining items are still
/// written.
pub async fn save_results(
    batch: &BatchCoordinator,
    report: &EnqueueReport,
    outcomes: &[ItemOutcome],
    output_dir: &Path,
    zip: bool,
) -> BatchSummary {
    let mut items: Vec<ItemSummary> = report
        .rejected
        .iter()
        .map(|file| ItemSummary {
            name: file.name.clone(),
            status: "rejected",
            original_size: None,
            output_size: None,
            output: None,
            error_code: Some(file.error_code),
            error: Some(file.reason.clone()),
        })
        .collect();

    let mut archive = None;
    let mut archive_error = None;
    if zip && outcomes.iter().any(|o| o.is_success()) {
        let saved = match batch.download_all().await {
            Ok(download) => save_download(output_dir, &download).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(path) => archive = Some(path),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save archive");
                archive_error = Some(e.client_message());
            }
        }
    }

    for outcome in outcomes {
        let mut summary = ItemSummary {
            name: outcome.name.clone(),
            status: "failed",
            original_size: batch
                .get(outcome.id)
                .map(|item| format_size(item.original_size())),
            output_size: None,
            output: None,
            error_code: None,
            error: None,
        };

        match &outcome.result {
            Ok(result) => {
                let saved = if zip {
                    Ok(None)
                } else {
                    match batch.download_one(outcome.id) {
                        Ok(download) => save_download(output_dir, &download).await.map(Some),
                        Err(e) => Err(e),
                    }
                };
                match saved {
                    Ok(output) => {
                        summary.status = "completed";
                        summary.output_size = Some(format_size(result.byte_size));
                        summary.output = output;
                    }
                    Err(e) => {
                        tracing::error!(name = %outcome.name, error = %e, "Failed to save image");
                        summary.error_code = Some(e.error_code());
                        summary.error = Some(e.client_message());
                    }
                }
            }
            Err(e) => {
                summary.error_code = Some(e.error_code());
                summary.error = Some(e.client_message());
            }
        }

        items.push(summary);
    }

    let converted = items.iter().filter(|i| i.status == "completed").count();
    let failed = items.iter().filter(|i| i.status == "failed").count();
    BatchSummary {
        converted,
        failed,
        rejected: report.rejected.len(),
        archive,
        archive_error,
        items,
    }
}


/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
