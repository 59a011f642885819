//! Clipstack - Configuration module

pub mod settings;

pub use settings::Settings;
