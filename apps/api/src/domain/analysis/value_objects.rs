use bytes::Bytes;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

lazy_static! {
    static ref WHITESPACE_RUN: regex::Regex = regex::Regex::new(r"\s+").unwrap();
    static ref UNSAFE_FILENAME_CHARS: regex::Regex = regex::Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Image formats the coach accepts for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptedFormat {
    Png,
    Jpeg,
    Gif,
}

impl AcceptedFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }
}

/// A file as it arrived in the multipart form, before any checks.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Bytes,
    pub filename: String,
    pub content_type: Option<String>,
}

impl UploadedImage {
    pub fn extension(&self) -> Option<&str> {
        self.filename.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// An upload that passed validation: sniffed format and pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedImage {
    pub format: AcceptedFormat,
    pub width: u32,
    pub height: u32,
}

/// An upload written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
    pub format: AcceptedFormat,
    pub size_bytes: usize,
    pub width: u32,
    pub height: u32,
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Directory components are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9._-]` is removed and leading dots/underscores are stripped so the
/// result can never be hidden or climb out of the upload directory.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let spaced = WHITESPACE_RUN.replace_all(base.trim(), "_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&spaced, "");
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Generate a collision-free storage key for an upload.
///
/// Keys are `<uuid-v7>-<sanitized stem>.<ext>` where the extension always
/// matches the sniffed format.
pub fn storage_key_for(filename: &str, format: AcceptedFormat) -> String {
    let id = Uuid::now_v7();
    let sanitized = sanitize_filename(filename);
    let stem = match sanitized.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => sanitized.as_str(),
    };

    if stem.is_empty() {
        format!("{}.{}", id, format.extension())
    } else {
        format!("{}-{}.{}", id, stem, format.extension())
    }
}
