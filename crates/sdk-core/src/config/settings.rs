//! Persisted SDK settings (install location override, do-not-ask-again)

use crate::product::SdkProduct;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the settings document inside the product config directory
const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Settings stored under a product's namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSettings {
    /// Explicit SDK install directory, takes precedence over default locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_location: Option<PathBuf>,

    /// Skip the SDK gate and never show the install prompt
    pub do_not_ask_again: bool,
}

/// Key-value store backing the SDK gate
pub trait SettingsStore: Send + Sync {
    /// Load the current settings; missing values fall back to defaults
    fn load(&self) -> Result<ProductSettings>;

    /// Persist the given settings
    fn save(&self, settings: &ProductSettings) -> Result<()>;

    /// Where the settings live, if they have an on-disk location
    fn location(&self) -> Option<PathBuf> {
        None
    }

    /// Configured install location override
    fn install_location(&self) -> Option<PathBuf> {
        match self.load() {
            Ok(settings) => settings
                .sdk_location
                .filter(|p| !p.as_os_str().is_empty()),
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {:#}", e);
                None
            }
        }
    }

    /// Whether the user asked never to be prompted again
    fn do_not_ask_again(&self) -> bool {
        match self.load() {
            Ok(settings) => settings.do_not_ask_again,
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {:#}", e);
                false
            }
        }
    }

    fn set_do_not_ask_again(&self, value: bool) -> Result<()> {
        let mut settings = self.load()?;
        settings.do_not_ask_again = value;
        self.save(&settings)
    }

    fn set_install_location(&self, location: Option<PathBuf>) -> Result<()> {
        let mut settings = self.load()?;
        settings.sdk_location = location;
        self.save(&settings)
    }
}

/// YAML settings file shared by all products; each product owns one namespace
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    namespace: String,
}

impl FileSettings {
    pub fn new(path: PathBuf, namespace: impl Into<String>) -> Self {
        Self {
            path,
            namespace: namespace.into(),
        }
    }

    /// Settings file for a product: the product's env override, or
    /// `<config dir>/<product name>/settings.yaml`
    pub fn from_product<P: SdkProduct>(product: &P) -> Self {
        let path = std::env::var_os(product.settings_path_env())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_settings_path(product.name()));
        Self::new(path, product.settings_namespace())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, serde_yaml::Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

impl SettingsStore for FileSettings {
    fn load(&self) -> Result<ProductSettings> {
        let mut document = self.read_document()?;
        match document.remove(&self.namespace) {
            Some(value) => serde_yaml::from_value(value).with_context(|| {
                format!(
                    "Invalid '{}' section in {}",
                    self.namespace,
                    self.path.display()
                )
            }),
            None => Ok(ProductSettings::default()),
        }
    }

    fn save(&self, settings: &ProductSettings) -> Result<()> {
        let mut document = self.read_document()?;
        let value = serde_yaml::to_value(settings).context("Failed to serialize settings")?;
        document.insert(self.namespace.clone(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(&document).context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// In-memory settings, for embedding and tests
#[derive(Debug, Default)]
pub struct MemorySettings {
    settings: Mutex<ProductSettings>,
}

impl MemorySettings {
    pub fn new(settings: ProductSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Result<ProductSettings> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|_| anyhow::anyhow!("Settings lock poisoned"))
    }

    fn save(&self, settings: &ProductSettings) -> Result<()> {
        let mut current = self
            .settings
            .lock()
            .map_err(|_| anyhow::anyhow!("Settings lock poisoned"))?;
        *current = settings.clone();
        Ok(())
    }
}

fn default_settings_path(product_name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(product_name)
        .join(SETTINGS_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettings::new(dir.path().join("nope.yaml"), "projects");
        assert_eq!(store.load().unwrap(), ProductSettings::default());
        assert!(!store.do_not_ask_again());
        assert!(store.install_location().is_none());
    }

    #[test]
    fn test_round_trip_through_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");

        FileSettings::new(path.clone(), "projects")
            .set_do_not_ask_again(true)
            .unwrap();
        FileSettings::new(path.clone(), "projects")
            .set_install_location(Some(PathBuf::from("/opt/sdk")))
            .unwrap();

        let reopened = FileSettings::new(path, "projects");
        assert!(reopened.do_not_ask_again());
        assert_eq!(reopened.install_location(), Some(PathBuf::from("/opt/sdk")));
    }

    #[test]
    fn test_other_namespaces_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "editor:\n  theme: dark\n").unwrap();

        let store = FileSettings::new(path.clone(), "projects");
        store.set_do_not_ask_again(true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme: dark"));
        assert!(content.contains("doNotAskAgain: true"));
    }

    #[test]
    fn test_camel_case_keys_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "projects:\n  sdkLocation: /usr/lib/sdk\n").unwrap();

        let store = FileSettings::new(path, "projects");
        assert_eq!(store.install_location(), Some(PathBuf::from("/usr/lib/sdk")));
        assert!(!store.do_not_ask_again());
    }

    #[test]
    fn test_unreadable_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "projects: 42\n").unwrap();

        let store = FileSettings::new(path, "projects");
        assert!(store.load().is_err());
        assert!(!store.do_not_ask_again());
        assert!(store.install_location().is_none());
    }

    #[test]
    fn test_memory_settings() {
        let store = MemorySettings::default();
        store.set_do_not_ask_again(true).unwrap();
        assert!(store.do_not_ask_again());
        assert!(store.location().is_none());
    }
}
