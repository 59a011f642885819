//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, RgbImage, RgbaImage};
use parking_lot::Mutex;

use clipstack_lib::clipboard::{ClipboardBackend, ImageFormat};
use clipstack_lib::config::Settings;
use clipstack_lib::engine::Engine;
use clipstack_lib::error::BackendError;

#[derive(Default)]
struct FakeState {
    text: Option<String>,
    images: HashMap<ImageFormat, Vec<u8>>,
    fail_writes: bool,
    panic_next_read: bool,
    text_writes: usize,
    image_writes: Vec<(ImageFormat, Vec<u8>)>,
}

/// In-memory clipboard standing in for the OS one
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the clipboard with text, as a user copy would
    pub fn copy_text(&self, text: &str) {
        let mut state = self.state.lock();
        state.images.clear();
        state.text = Some(text.to_string());
    }

    /// Replace the clipboard with an image offered under `format`
    pub fn copy_image(&self, format: ImageFormat, data: Vec<u8>) {
        let mut state = self.state.lock();
        state.text = None;
        state.images.clear();
        state.images.insert(format, data);
    }

    /// Offer an additional image representation without clearing others
    pub fn offer_image(&self, format: ImageFormat, data: Vec<u8>) {
        self.state.lock().images.insert(format, data);
    }

    /// Make the next text read panic, as a misbehaving OS backend might
    pub fn panic_on_next_read(&self) {
        self.state.lock().panic_next_read = true;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn text(&self) -> Option<String> {
        self.state.lock().text.clone()
    }

    pub fn text_writes(&self) -> usize {
        self.state.lock().text_writes
    }

    pub fn image_writes(&self) -> Vec<(ImageFormat, Vec<u8>)> {
        self.state.lock().image_writes.clone()
    }
}

impl ClipboardBackend for FakeBackend {
    fn read_text(&self) -> Result<Option<String>, BackendError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.panic_next_read) {
            drop(state);
            panic!("fake backend read failure");
        }
        Ok(state.text.clone())
    }

    fn read_image(&self, format: ImageFormat) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.state.lock().images.get(&format).cloned())
    }

    fn write_text(&self, text: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(BackendError::Exit {
                command: "fake",
                status: 1,
            });
        }
        state.images.clear();
        state.text = Some(text.to_string());
        state.text_writes += 1;
        Ok(())
    }

    fn write_image(&self, data: &[u8], format: ImageFormat) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(BackendError::Exit {
                command: "fake",
                status: 1,
            });
        }
        state.text = None;
        state.images.clear();
        state.images.insert(format, data.to_vec());
        state.image_writes.push((format, data.to_vec()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub fn settings(capacity: usize) -> Settings {
    Settings {
        history_capacity: capacity,
        poll_interval_ms: 10,
        guard_grace_ms: 5,
        ..Settings::default()
    }
}

pub fn engine(capacity: usize) -> (Arc<FakeBackend>, Engine) {
    let backend = FakeBackend::new();
    let engine = Engine::new(&settings(capacity), backend.clone());
    (backend, engine)
}

/// A small solid square encoded as `format`
pub fn encoded_image(format: image::ImageFormat, side: u32) -> Vec<u8> {
    let img = if format == image::ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(side, side, image::Rgb([40, 40, 220])))
    } else {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(side, side, image::Rgba([220, 40, 40, 255])))
    };
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).expect("encode fixture");
    out
}
