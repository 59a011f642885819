//! Clipstack - Clipboard content data models
//!
//! Defines captured clipboard items and the views handed to presentation

use std::fmt;

use blake3::Hasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum characters shown in a text preview
pub const PREVIEW_CHARS: usize = 40;

/// Clipboard content type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Plain text
    Text,
    /// Raster image
    Image,
}

impl ContentType {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
        }
    }
}

/// Image formats the clipboard may offer, in MIME-tag form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl ImageFormat {
    /// Default candidate order when reading images
    pub const DEFAULT_PRIORITY: [ImageFormat; 4] =
        [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp, ImageFormat::Gif];

    /// MIME target name
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Matching decoder format in the `image` crate
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A captured clipboard entry
///
/// Equality covers the content type and the payload bytes only; the
/// fingerprint is compared first as a shortcut and the capture time is ignored.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    content_type: ContentType,
    payload: Vec<u8>,
    hash: String,
    captured_at: DateTime<Utc>,
}

impl ClipboardItem {
    /// Create new text item
    pub fn new_text(text: impl Into<String>) -> Self {
        Self::new(ContentType::Text, text.into().into_bytes())
    }

    /// Create new image item from an encoded image payload
    pub fn new_image(payload: Vec<u8>) -> Self {
        Self::new(ContentType::Image, payload)
    }

    fn new(content_type: ContentType, payload: Vec<u8>) -> Self {
        let hash = compute_hash(&payload);
        Self {
            content_type,
            payload,
            hash,
            captured_at: Utc::now(),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Content fingerprint (blake3, hex)
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Text content, for text items
    pub fn as_text(&self) -> Option<&str> {
        match self.content_type {
            ContentType::Text => std::str::from_utf8(&self.payload).ok(),
            ContentType::Image => None,
        }
    }

    /// Preview text for list display
    pub fn preview(&self) -> String {
        match self.as_text() {
            Some(text) => generate_preview(text, PREVIEW_CHARS),
            None => "[Image]".to_string(),
        }
    }
}

impl PartialEq for ClipboardItem {
    fn eq(&self, other: &Self) -> bool {
        self.content_type == other.content_type
            && self.hash == other.hash
            && self.payload == other.payload
    }
}

impl Eq for ClipboardItem {}

/// Simplified record for presentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipboardItemView {
    pub index: usize,
    pub content_type: ContentType,
    pub preview: String,
    pub size_bytes: usize,
    pub captured_at: DateTime<Utc>,
}

impl ClipboardItemView {
    pub fn new(index: usize, item: &ClipboardItem) -> Self {
        Self {
            index,
            content_type: item.content_type,
            preview: item.preview(),
            size_bytes: item.payload.len(),
            captured_at: item.captured_at,
        }
    }
}

/// Generate preview text
fn generate_preview(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

/// Compute content hash
pub(crate) fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize().to_hex().to_string()
}
