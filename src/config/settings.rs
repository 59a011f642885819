//! Clipstack - User settings module
//!
//! Manages engine configuration loaded from a JSON file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clipboard::{BackendKind, ImageFormat};
use crate::error::ConfigError;
use crate::hotkey::Modifier;
use crate::storage::DEFAULT_CAPACITY;

/// Largest accepted `maxImageBytes` (1 GiB)
pub const MAX_IMAGE_BYTES_CEILING: usize = 1 << 30;

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Maximum number of history entries
    pub history_capacity: usize,
    /// Clipboard polling period (milliseconds)
    pub poll_interval_ms: u64,
    /// Delay before detection resumes after the engine's own write (milliseconds)
    pub guard_grace_ms: u64,
    /// Image candidate formats, highest priority first
    pub image_format_priority: Vec<ImageFormat>,
    /// Modifier that must be held for the reveal hotkey
    pub modifier_key: Modifier,
    /// Chord key pressed while the modifier is held
    pub chord_key: String,
    /// Clipboard backend implementation
    pub backend: BackendKind,
    /// Strip surrounding whitespace from captured text
    pub trim_text: bool,
    /// Largest raw image payload accepted (bytes)
    pub max_image_bytes: usize,
    /// Largest accepted image width or height (pixels)
    pub max_image_dimension: u32,
    /// Pending reveal signals kept for a slow presenter
    pub reveal_queue: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            poll_interval_ms: 500,
            guard_grace_ms: 100,
            image_format_priority: ImageFormat::DEFAULT_PRIORITY.to_vec(),
            modifier_key: Modifier::Alt,
            chord_key: "y".to_string(),
            backend: BackendKind::Auto,
            trim_text: true,
            max_image_bytes: 64 * 1024 * 1024,
            max_image_dimension: 16_384,
            reveal_queue: 8,
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("clipstack").join("settings.json"))
    }

    /// Load settings from a file; keys that are absent keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        log::info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// Load from `path`, or from the default location; a missing file yields defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                log::warn!("No configuration directory available, using default settings");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            log::info!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(invalid("historyCapacity", "must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("pollIntervalMs", "must be at least 1"));
        }
        if self.image_format_priority.is_empty() {
            return Err(invalid("imageFormatPriority", "must list at least one format"));
        }
        if self.chord_key.chars().count() != 1 {
            return Err(invalid(
                "chordKey",
                format!("expected a single character, got {:?}", self.chord_key),
            ));
        }
        if self.max_image_bytes == 0 || self.max_image_bytes > MAX_IMAGE_BYTES_CEILING {
            return Err(invalid(
                "maxImageBytes",
                format!("must be between 1 and {}", MAX_IMAGE_BYTES_CEILING),
            ));
        }
        if self.max_image_dimension == 0 {
            return Err(invalid("maxImageDimension", "must be at least 1"));
        }
        if self.reveal_queue == 0 {
            return Err(invalid("revealQueue", "must be at least 1"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn guard_grace(&self) -> Duration {
        Duration::from_millis(self.guard_grace_ms)
    }

    /// The chord key as a lowercase character
    pub fn chord_char(&self) -> char {
        self.chord_key
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('y')
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}
