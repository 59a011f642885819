//! Clipstack - Clipboard backend module
//!
//! OS-level clipboard access. Validation of what a backend returns belongs to the classifier.

use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use arboard::Clipboard;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::models::ImageFormat;
use crate::error::BackendError;

/// Read/write access to the system clipboard
pub trait ClipboardBackend: Send + Sync {
    /// Current clipboard text, `None` when the clipboard holds no text
    fn read_text(&self) -> Result<Option<String>, BackendError>;

    /// Raw payload offered under the given image format, if any
    fn read_image(&self, format: ImageFormat) -> Result<Option<Vec<u8>>, BackendError>;

    fn write_text(&self, text: &str) -> Result<(), BackendError>;

    /// Write an encoded image payload, advertised as `format`
    fn write_image(&self, data: &[u8], format: ImageFormat) -> Result<(), BackendError>;

    /// Backend name (for logging)
    fn name(&self) -> &'static str;

    /// First payload the backend supplies, trying `formats` in order
    ///
    /// Errors for a single format are logged and the next one is tried.
    fn read_first_image(&self, formats: &[ImageFormat]) -> Option<(ImageFormat, Vec<u8>)> {
        for &format in formats {
            match self.read_image(format) {
                Ok(Some(data)) if !data.is_empty() => return Some((format, data)),
                Ok(_) => {}
                Err(e) => log::error!("[Backend] Error reading {} from clipboard: {}", format, e),
            }
        }
        None
    }
}

/// Which backend implementation to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Auto,
    Arboard,
    Xclip,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "arboard" => Ok(BackendKind::Arboard),
            "xclip" => Ok(BackendKind::Xclip),
            other => Err(format!("unknown backend `{}`", other)),
        }
    }
}

/// Construct the configured backend
pub fn create_backend(kind: BackendKind) -> Result<Arc<dyn ClipboardBackend>, BackendError> {
    let backend: Arc<dyn ClipboardBackend> = match kind {
        BackendKind::Auto | BackendKind::Arboard => Arc::new(ArboardBackend::new()?),
        BackendKind::Xclip => Arc::new(XclipBackend::new()),
    };
    log::info!("[Backend] Using {} clipboard backend", backend.name());
    Ok(backend)
}

/// Backend built on `arboard`
///
/// arboard only hands out decoded RGBA pixels, so images are offered as PNG
/// and every other format reads as absent.
pub struct ArboardBackend {
    // Kept alive for the process lifetime: on X11 the clipboard contents we
    // set are only served while an instance exists.
    clipboard: Mutex<Clipboard>,
}

impl ArboardBackend {
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self {
            clipboard: Mutex::new(Clipboard::new()?),
        })
    }

    /// Convert RGBA image data to PNG
    fn rgba_to_png(image: &arboard::ImageData) -> Result<Vec<u8>, BackendError> {
        use image::{ImageBuffer, Rgba};

        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(
            image.width as u32,
            image.height as u32,
            image.bytes.to_vec(),
        )
        .ok_or_else(|| {
            BackendError::Image(image::ImageError::Parameter(
                image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ),
            ))
        })?;

        let mut png_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)?;
        Ok(png_data)
    }
}

impl ClipboardBackend for ArboardBackend {
    fn read_text(&self) -> Result<Option<String>, BackendError> {
        match self.clipboard.lock().get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_image(&self, format: ImageFormat) -> Result<Option<Vec<u8>>, BackendError> {
        if format != ImageFormat::Png {
            return Ok(None);
        }
        let image = match self.clipboard.lock().get_image() {
            Ok(image) => image,
            Err(arboard::Error::ContentNotAvailable) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        log::debug!("[Backend] Detected direct image: {}x{}", image.width, image.height);
        Self::rgba_to_png(&image).map(Some)
    }

    fn write_text(&self, text: &str) -> Result<(), BackendError> {
        self.clipboard.lock().set_text(text)?;
        Ok(())
    }

    fn write_image(&self, data: &[u8], format: ImageFormat) -> Result<(), BackendError> {
        let img = image::load_from_memory_with_format(data, format.to_image_format())?.into_rgba8();
        let (width, height) = img.dimensions();
        let image_data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: std::borrow::Cow::Owned(img.into_raw()),
        };
        self.clipboard.lock().set_image(image_data)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "arboard"
    }
}

/// Backend driving the `xclip` command line tool against the CLIPBOARD selection
#[derive(Debug, Clone)]
pub struct XclipBackend {
    program: PathBuf,
}

impl Default for XclipBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl XclipBackend {
    const COMMAND: &'static str = "xclip";

    /// Run `xclip` as found on `PATH`
    pub fn new() -> Self {
        Self::with_program(Self::COMMAND)
    }

    /// Run the executable at `program` instead
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Read a target; a non-zero exit means the target is not offered
    fn read_target(&self, mime: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let output = Command::new(&self.program)
            .args(["-selection", "clipboard", "-o", "-t", mime])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BackendError::Spawn {
                command: Self::COMMAND,
                source,
            })?;

        if !output.status.success() {
            log::debug!(
                "[Backend] xclip has no {} target: {}",
                mime,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }
        if output.stdout.is_empty() {
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }

    fn write_target(&self, mime: &str, data: &[u8]) -> Result<(), BackendError> {
        let mut child = Command::new(&self.program)
            .args(["-selection", "clipboard", "-t", mime, "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                command: Self::COMMAND,
                source,
            })?;

        // The child is reaped even when feeding it fails (xclip may exit early
        // and close the pipe). The write error wins over the wait error.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(data),
            None => Ok(()),
        };
        let status = child.wait();
        written?;
        let status = status?;
        if !status.success() {
            return Err(BackendError::Exit {
                command: Self::COMMAND,
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

impl ClipboardBackend for XclipBackend {
    fn read_text(&self) -> Result<Option<String>, BackendError> {
        Ok(self
            .read_target("text/plain")?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn read_image(&self, format: ImageFormat) -> Result<Option<Vec<u8>>, BackendError> {
        self.read_target(format.mime())
    }

    fn write_text(&self, text: &str) -> Result<(), BackendError> {
        self.write_target("UTF8_STRING", text.as_bytes())
    }

    fn write_image(&self, data: &[u8], format: ImageFormat) -> Result<(), BackendError> {
        self.write_target(format.mime(), data)
    }

    fn name(&self) -> &'static str {
        "xclip"
    }
}
