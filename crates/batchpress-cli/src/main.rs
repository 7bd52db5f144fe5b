//! Batchpress CLI: batch image conversion from the command line.
//!
//! Defaults come from BATCHPRESS_* environment variables (or `.env`, loaded by
//! `BatchConfig::from_env`); flags override them.

use anyhow::Context;
use batchpress_cli::{apply_overrides, init_tracing, save_results, Overrides};
use batchpress_core::{BatchConfig, FormatId};
use batchpress_processing::{
    format_capabilities, probe_supported_formats, ConversionPipeline, InputFile,
};
use batchpress_services::{BatchCoordinator, TracingObserver};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "batchpress", about = "Batch image converter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the output formats and whether this build can encode them
    Formats,
    /// Convert images and save the results
    Convert {
        /// Input image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target format, as MIME type or extension (e.g. image/webp, png)
        #[arg(long)]
        format: Option<String>,
        /// Maximum output width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Maximum output height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Keep the source aspect ratio
        #[arg(long)]
        lock_aspect: Option<bool>,
        /// Quality 0-100, used by JPEG, WebP and TIFF
        #[arg(long)]
        quality: Option<u8>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save a single zip archive instead of individual files
        #[arg(long)]
        zip: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Formats => {
            let pipeline = ConversionPipeline::default();
            let supported = probe_supported_formats(pipeline.codec().as_ref());
            print_json(&format_capabilities(&supported))?;
        }
        Commands::Convert {
            files,
            format,
            width,
            height,
            lock_aspect,
            quality,
            out,
            zip,
        } => {
            let format = format
                .map(|f| f.parse::<FormatId>())
                .transpose()
                .context("Unknown --format")?;
            let overrides = Overrides {
                format,
                width,
                height,
                lock_aspect_ratio: lock_aspect,
                quality,
                output_dir: out,
            };
            let config = apply_overrides(BatchConfig::from_env()?, &overrides);
            config.validate().context("Invalid configuration")?;

            run_convert(files, &config, zip).await?;
        }
    }

    Ok(())
}

async fn run_convert(files: Vec<PathBuf>, config: &BatchConfig, zip: bool) -> anyhow::Result<()> {
    let mut inputs = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        inputs.push(InputFile::detect(name, bytes));
    }

    let mut batch = BatchCoordinator::new(ConversionPipeline::default(), config)?
        .with_observer(Arc::new(TracingObserver));

    let report = batch.enqueue(inputs);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing the current image");
                cancel.cancel();
            }
        })
    };
    let outcomes = batch.convert_all_until(&cancel).await;
    ctrl_c.abort();

    let summary = save_results(&batch, &report, &outcomes, &config.output_dir, zip).await;
    print_json(&summary)?;

    if summary.has_failures() {
        anyhow::bail!(
            "{} image(s) failed, {} file(s) rejected",
            summary.failed,
            summary.rejected
        );
    }

    Ok(())
}
