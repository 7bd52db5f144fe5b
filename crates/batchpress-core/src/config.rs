//! Configuration module
//!
//! Default conversion settings and packaging options, read from the
//! environment (and an optional `.env` file). Command-line flags override
//! these values.

use std::env;
use std::path::PathBuf;

use crate::formats::FormatId;
use crate::models::ConversionParams;

const DEFAULT_WIDTH: u32 = 1920;
const DEFAULT_HEIGHT: u32 = 1080;
const DEFAULT_QUALITY: u8 = 80;
const MAX_FILE_SIZE_MB: usize = 50;
const ARCHIVE_NAME: &str = "compressed_images.zip";

/// Batch conversion configuration
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub target_format: FormatId,
    pub width: u32,
    pub height: u32,
    pub lock_aspect_ratio: bool,
    pub quality: u8,
    pub max_file_size_bytes: usize,
    pub archive_name: String,
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            target_format: FormatId::Jpeg,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            lock_aspect_ratio: true,
            quality: DEFAULT_QUALITY,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            archive_name: ARCHIVE_NAME.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl BatchConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Malformed
    /// numbers fall back to their defaults; an unknown format is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_format = match lookup("BATCHPRESS_FORMAT") {
            Some(value) => value
                .parse::<FormatId>()
                .map_err(|_| anyhow::anyhow!("BATCHPRESS_FORMAT is not a supported format: {}", value))?,
            None => FormatId::Jpeg,
        };

        let max_file_size_mb = lookup("BATCHPRESS_MAX_FILE_SIZE_MB")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = BatchConfig {
            target_format,
            width: lookup("BATCHPRESS_WIDTH")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_WIDTH),
            height: lookup("BATCHPRESS_HEIGHT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_HEIGHT),
            lock_aspect_ratio: lookup("BATCHPRESS_LOCK_ASPECT")
                .map(|s| parse_bool(&s))
                .unwrap_or(true),
            quality: lookup("BATCHPRESS_QUALITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_QUALITY),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            archive_name: lookup("BATCHPRESS_ARCHIVE_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| ARCHIVE_NAME.to_string()),
            output_dir: lookup("BATCHPRESS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.conversion_params()
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "BATCHPRESS_MAX_FILE_SIZE_MB must be greater than zero"
            ));
        }

        if !self.archive_name.to_lowercase().ends_with(".zip") {
            return Err(anyhow::anyhow!(
                "BATCHPRESS_ARCHIVE_NAME must end with .zip"
            ));
        }

        Ok(())
    }

    pub fn conversion_params(&self) -> ConversionParams {
        ConversionParams {
            target_format: self.target_format,
            width: self.width,
            height: self.height,
            lock_aspect_ratio: self.lock_aspect_ratio,
            quality: self.quality,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
