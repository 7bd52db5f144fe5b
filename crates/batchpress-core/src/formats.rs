//! Format registry
//!
//! Static table of the six image formats accepted as input and offered as
//! conversion targets, keyed by MIME type.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// One of the six supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatId {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    WebP,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/bmp")]
    Bmp,
    #[serde(rename = "image/tiff")]
    Tiff,
}

/// Capabilities of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub id: FormatId,
    pub mime_type: &'static str,
    pub extension: &'static str,
    /// Encoder accepts a lossy quality parameter
    pub quality_support: bool,
    /// Output can carry transparency
    pub alpha_support: bool,
    pub description: &'static str,
}

const REGISTRY: [FormatSpec; 6] = [
    FormatSpec {
        id: FormatId::Jpeg,
        mime_type: "image/jpeg",
        extension: "jpg",
        quality_support: true,
        alpha_support: false,
        description: "Best for photos, small files",
    },
    FormatSpec {
        id: FormatId::Png,
        mime_type: "image/png",
        extension: "png",
        quality_support: false,
        alpha_support: true,
        description: "Transparent backgrounds, lossless",
    },
    FormatSpec {
        id: FormatId::WebP,
        mime_type: "image/webp",
        extension: "webp",
        quality_support: true,
        alpha_support: false,
        description: "Higher compression, modern format",
    },
    FormatSpec {
        id: FormatId::Gif,
        mime_type: "image/gif",
        extension: "gif",
        quality_support: false,
        alpha_support: true,
        description: "Animation support, simple graphics",
    },
    FormatSpec {
        id: FormatId::Bmp,
        mime_type: "image/bmp",
        extension: "bmp",
        quality_support: false,
        alpha_support: false,
        description: "Uncompressed, full fidelity",
    },
    FormatSpec {
        id: FormatId::Tiff,
        mime_type: "image/tiff",
        extension: "tiff",
        quality_support: true,
        alpha_support: false,
        description: "Professional imaging, multi-page",
    },
];

impl FormatId {
    /// All registry entries in display order
    pub fn all() -> [FormatId; 6] {
        [
            FormatId::Jpeg,
            FormatId::Png,
            FormatId::WebP,
            FormatId::Gif,
            FormatId::Bmp,
            FormatId::Tiff,
        ]
    }

    pub fn spec(self) -> &'static FormatSpec {
        &REGISTRY[self as usize]
    }

    pub fn mime_type(self) -> &'static str {
        self.spec().mime_type
    }

    pub fn extension(self) -> &'static str {
        self.spec().extension
    }

    /// Look up a declared MIME type. `image/jpg` is accepted as an alias.
    pub fn from_mime(mime_type: &str) -> Option<FormatId> {
        let normalized = mime_type.trim().to_lowercase();
        if normalized == "image/jpg" {
            return Some(FormatId::Jpeg);
        }
        REGISTRY
            .iter()
            .find(|spec| spec.mime_type == normalized)
            .map(|spec| spec.id)
    }

    /// Look up a file extension (without the dot)
    pub fn from_extension(extension: &str) -> Option<FormatId> {
        match extension.trim().to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(FormatId::Jpeg),
            "png" => Some(FormatId::Png),
            "webp" => Some(FormatId::WebP),
            "gif" => Some(FormatId::Gif),
            "bmp" => Some(FormatId::Bmp),
            "tif" | "tiff" => Some(FormatId::Tiff),
            _ => None,
        }
    }
}

impl Display for FormatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.mime_type())
    }
}

impl FromStr for FormatId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatId::from_mime(s)
            .or_else(|| FormatId::from_extension(s))
            .ok_or_else(|| anyhow::anyhow!("Invalid format: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_six_entries_in_order() {
        for (index, id) in FormatId::all().into_iter().enumerate() {
            assert_eq!(REGISTRY[index].id, id);
        }
    }

    #[test]
    fn test_quality_support() {
        assert!(FormatId::Jpeg.spec().quality_support);
        assert!(FormatId::WebP.spec().quality_support);
        assert!(FormatId::Tiff.spec().quality_support);
        assert!(!FormatId::Png.spec().quality_support);
        assert!(!FormatId::Gif.spec().quality_support);
        assert!(!FormatId::Bmp.spec().quality_support);
    }

    #[test]
    fn test_alpha_support() {
        assert!(FormatId::Png.spec().alpha_support);
        assert!(FormatId::Gif.spec().alpha_support);
        assert!(!FormatId::Jpeg.spec().alpha_support);
        assert!(!FormatId::Bmp.spec().alpha_support);
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(FormatId::from_mime("image/png"), Some(FormatId::Png));
        assert_eq!(FormatId::from_mime("IMAGE/JPEG"), Some(FormatId::Jpeg));
        assert_eq!(FormatId::from_mime("image/jpg"), Some(FormatId::Jpeg));
        assert_eq!(FormatId::from_mime("image/x-icon"), None);
        assert_eq!(FormatId::from_mime("image/svg+xml"), None);
        assert_eq!(FormatId::from_mime(""), None);
    }

    #[test]
    fn test_from_str_accepts_mime_and_extension() {
        assert_eq!("image/webp".parse::<FormatId>().unwrap(), FormatId::WebP);
        assert_eq!("jpeg".parse::<FormatId>().unwrap(), FormatId::Jpeg);
        assert_eq!("TIF".parse::<FormatId>().unwrap(), FormatId::Tiff);
        assert!("ico".parse::<FormatId>().is_err());
    }

    #[test]
    fn test_display_is_mime_type() {
        assert_eq!(FormatId::Bmp.to_string(), "image/bmp");
        assert_eq!(FormatId::Jpeg.extension(), "jpg");
    }
}
