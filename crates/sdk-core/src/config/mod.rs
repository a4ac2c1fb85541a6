//! Settings persistence

pub mod settings;

pub use settings::{FileSettings, MemorySettings, ProductSettings, SettingsStore};
