//! Clipstack - Content classification module
//!
//! Turns raw backend reads into typed, validated payloads

use std::io::Cursor;

use image::{DynamicImage, ImageReader, Limits};

use super::backend::ClipboardBackend;
use super::models::ImageFormat;
use crate::config::Settings;
use crate::error::BackendError;

/// An image payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Content classifier
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    formats: Vec<ImageFormat>,
    trim_text: bool,
    max_image_bytes: usize,
    max_image_dimension: u32,
}

impl ContentClassifier {
    pub fn new(
        formats: Vec<ImageFormat>,
        trim_text: bool,
        max_image_bytes: usize,
        max_image_dimension: u32,
    ) -> Self {
        Self {
            formats,
            trim_text,
            max_image_bytes,
            max_image_dimension,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.image_format_priority.clone(),
            settings.trim_text,
            settings.max_image_bytes,
            settings.max_image_dimension,
        )
    }

    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }

    /// Normalize a text read; empty text counts as no text
    pub fn classify_text(&self, raw: Option<String>) -> Option<String> {
        let text = raw?;
        let text = if self.trim_text {
            text.trim().to_string()
        } else {
            text
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Read the first candidate format that the backend offers and that decodes cleanly
    pub fn read_image(&self, backend: &dyn ClipboardBackend) -> Option<ValidatedImage> {
        let mut remaining = self.formats.as_slice();
        while let Some((format, data)) = backend.read_first_image(remaining) {
            match self.validate(&data, format) {
                Ok(img) => {
                    log::debug!(
                        "[Classifier] Image format {} is valid ({}x{}, {} bytes)",
                        format,
                        img.width(),
                        img.height(),
                        data.len()
                    );
                    return Some(ValidatedImage { format, data });
                }
                Err(e) => {
                    log::error!("[Classifier] Image format {} is not valid: {}", format, e);
                }
            }
            let tried = remaining.iter().position(|&f| f == format).map_or(remaining.len(), |i| i + 1);
            remaining = &remaining[tried..];
        }
        None
    }

    /// Fully decode a payload under the decoding limits
    ///
    /// The content sniffed from the bytes wins over the advertised format;
    /// `declared` is only used when sniffing fails.
    pub fn validate(&self, data: &[u8], declared: ImageFormat) -> Result<DynamicImage, BackendError> {
        if data.len() > self.max_image_bytes {
            return Err(BackendError::TooLarge {
                size: data.len(),
                limit: self.max_image_bytes,
            });
        }

        let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        if reader.format().is_none() {
            reader.set_format(declared.to_image_format());
        }

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_image_dimension);
        limits.max_image_height = Some(self.max_image_dimension);
        limits.max_alloc = Some((self.max_image_bytes as u64).saturating_mul(8));
        reader.limits(limits);

        Ok(reader.decode()?)
    }

    /// Re-encode an image payload as PNG for writing back to the clipboard
    pub fn encode_png(&self, data: &[u8]) -> Result<Vec<u8>, BackendError> {
        let img = self.validate(data, ImageFormat::Png)?;
        let mut png_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)?;
        Ok(png_data)
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
