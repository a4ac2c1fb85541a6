//! Install prompt actions and the prompter abstraction

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// Actions offered when the SDK is missing or too old
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptAction {
    OpenSettings,
    OpenInstallPage,
    DoNotAskAgain,
}

impl PromptAction {
    /// Every action, in display order
    pub const ALL: [PromptAction; 3] = [
        PromptAction::OpenSettings,
        PromptAction::OpenInstallPage,
        PromptAction::DoNotAskAgain,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PromptAction::OpenSettings => "Update location",
            PromptAction::OpenInstallPage => "Install",
            PromptAction::DoNotAskAgain => "Don't ask again",
        }
    }
}

impl fmt::Display for PromptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// User-interaction boundary for the install prompt
pub trait Prompter: Send + Sync {
    /// Show `message` with the given actions; `None` means dismissed
    fn choose(&self, message: &str, actions: &[PromptAction]) -> Result<Option<PromptAction>>;

    /// Open an external URL in the default browser
    fn open_url(&self, url: &str) -> Result<()> {
        open::that(url).with_context(|| format!("Failed to open {}", url))
    }

    /// Open the settings where the install location override lives
    fn open_settings(&self, location: Option<&Path>) -> Result<()> {
        let path = location.context("Settings have no on-disk location")?;
        ensure_file(path)?;
        open::that(path).with_context(|| format!("Failed to open {}", path.display()))
    }
}

/// Create an empty file (and its parents) so an editor can open it
pub(crate) fn ensure_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, "").with_context(|| format!("Failed to create {}", path.display()))
}

/// Non-interactive prompter: logs the message and dismisses it
#[derive(Debug, Default)]
pub struct DismissingPrompter;

impl Prompter for DismissingPrompter {
    fn choose(&self, message: &str, _actions: &[PromptAction]) -> Result<Option<PromptAction>> {
        log::warn!("{}", message);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dismissing_prompter_never_chooses() {
        let choice = DismissingPrompter
            .choose("SDK missing", &PromptAction::ALL)
            .unwrap();
        assert!(choice.is_none());
    }

    #[test]
    fn test_open_settings_requires_location() {
        assert!(DismissingPrompter.open_settings(None).is_err());
    }

    #[test]
    fn test_ensure_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("settings.yaml");
        ensure_file(&path).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "keep").unwrap();
        ensure_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            PromptAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), 3);
    }
}
