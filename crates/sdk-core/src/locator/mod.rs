//! SDK discovery, version gate and command execution
//!
//! [`SdkLocator`] ties the pieces together:
//! - finds the SDK from the configured override or the platform defaults
//! - checks the installed version against the product's minimum
//! - prompts the user when the SDK is missing or too old
//! - runs SDK commands, streaming output to the injected sink
//!
//! The recorded [`InstallationState`] is overwritten by every gate check.
//! Concurrent checks on one locator can interleave and leave either result
//! behind; nothing here relies on it being current.

pub mod state;

use crate::config::SettingsStore;
use crate::error::{Result, SdkError};
use crate::platform::{self, Platform};
use crate::process::{self, CommandOptions, ProcessOutcome};
use crate::product::SdkProduct;
use crate::prompt::{PromptAction, Prompter};
use crate::sink::OutputSink;
use crate::version;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use url::Url;

pub use state::{ErrorKind, InstallationState};

type PathExists = Box<dyn Fn(&Path) -> bool + Send + Sync>;
type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Locates an SDK installation and runs its commands
pub struct SdkLocator<P: SdkProduct> {
    product: P,
    platform: Platform,
    settings: Arc<dyn SettingsStore>,
    prompter: Arc<dyn Prompter>,
    sink: Arc<dyn OutputSink>,
    path_exists: PathExists,
    env: EnvLookup,
    home: Option<PathBuf>,
    state: Mutex<InstallationState>,
}

impl<P: SdkProduct> SdkLocator<P> {
    /// Create a locator for the current platform and environment
    pub fn new(
        product: P,
        settings: Arc<dyn SettingsStore>,
        prompter: Arc<dyn Prompter>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            product,
            platform: Platform::current(),
            settings,
            prompter,
            sink,
            path_exists: Box::new(|p: &Path| p.exists()),
            env: Box::new(|key: &str| std::env::var(key).ok()),
            home: dirs::home_dir(),
            state: Mutex::new(InstallationState::default()),
        }
    }

    /// Override the platform used for default path lookup
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Override the existence check applied to SDK executables
    pub fn with_path_exists<F>(mut self, exists: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.path_exists = Box::new(exists);
        self
    }

    /// Override environment lookup used for Windows program directories
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(env);
        self
    }

    /// Override the home directory used for per-user installs
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn product(&self) -> &P {
        &self.product
    }

    /// Snapshot of the most recent gate check
    pub fn installation_state(&self) -> InstallationState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn update_state(&self, update: impl FnOnce(&mut InstallationState)) {
        if let Ok(mut state) = self.state.lock() {
            update(&mut state);
        }
    }

    /// SDK executable file name on this locator's platform
    pub fn executable_name(&self) -> String {
        self.product.executable_name(self.platform)
    }

    /// Directory of the SDK installation, if one can be found
    ///
    /// The configured override wins without further checks; otherwise the
    /// first default candidate containing the executable is returned.
    pub fn locate_installation(&self) -> Option<PathBuf> {
        if let Some(configured) = self.settings.install_location() {
            log::debug!("Using configured SDK location {}", configured.display());
            return Some(configured);
        }

        let candidates =
            platform::default_candidates(self.platform, &self.product, &self.env, self.home.as_deref());
        let found = platform::first_installed(&candidates, &self.executable_name(), &self.path_exists);
        match &found {
            Some(dir) => log::debug!("Found {} in {}", self.product.name(), dir.display()),
            None => log::debug!(
                "{} not found on {} in any of {:?}",
                self.product.name(),
                self.platform,
                candidates
            ),
        }
        found
    }

    /// Full path of the SDK executable, if an installation can be found
    pub fn executable_path(&self) -> Option<PathBuf> {
        self.locate_installation()
            .map(|dir| dir.join(self.executable_name()))
    }

    /// Executable inside `installation`, only if it is actually there
    ///
    /// A configured location is accepted by discovery as-is, so it may point at
    /// a directory without the SDK in it.
    fn installed_executable(&self, installation: Option<&Path>) -> Option<PathBuf> {
        let executable = installation?.join(self.executable_name());
        if (self.path_exists)(&executable) {
            Some(executable)
        } else {
            log::debug!("{} does not exist", executable.display());
            None
        }
    }

    /// Check the installed version against the product minimum
    ///
    /// Returns `Ok(None)` when the version command cannot be run at all (no
    /// installation, no executable in it, or the spawn itself failed). A
    /// version command that runs but fails is an error, distinct from an
    /// unsupported version.
    pub async fn is_version_supported(&self) -> Result<Option<bool>> {
        let installation = self.locate_installation();
        let executable = self.installed_executable(installation.as_deref());
        self.check_version(executable.as_deref()).await
    }

    async fn check_version(&self, executable: Option<&Path>) -> Result<Option<bool>> {
        let Some(executable) = executable else {
            log::debug!("Skipping version check, {} not located", self.product.name());
            return Ok(None);
        };
        let command_line = format!("{} --version", process::quote_path(executable));

        let output = match process::run_captured(&command_line).await {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Could not run '{}': {}", command_line, e);
                return Ok(None);
            }
        };

        let outcome = ProcessOutcome::from(output.status);
        if !outcome.success() {
            return Err(SdkError::VersionCheckFailed {
                command: command_line,
                status: outcome.to_string(),
            });
        }

        let installed = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let supported = version::meets_minimum(&installed, self.product.min_version());
        log::debug!(
            "{} version {} (minimum {}): supported = {}",
            self.product.name(),
            installed,
            self.product.min_version(),
            supported
        );
        self.update_state(|state| state.installed_version = Some(installed));
        Ok(Some(supported))
    }

    /// Presence and version gate guarding command execution
    ///
    /// With do-not-ask-again set this passes immediately without spawning
    /// anything. Otherwise a failed check shows the install prompt once and
    /// returns `false` whatever the user picks; the caller retries after
    /// fixing the installation.
    pub async fn ensure_available(&self) -> Result<bool> {
        if self.settings.do_not_ask_again() {
            log::debug!("SDK gate disabled by do-not-ask-again");
            return Ok(true);
        }

        // Resolve once so the presence flag and the version check agree.
        let installation = self.locate_installation();
        let executable = self.installed_executable(installation.as_deref());
        let supported = self.check_version(executable.as_deref()).await?;
        let present = executable.is_some();
        let error = match (present, supported) {
            (true, Some(true)) => ErrorKind::None,
            (true, Some(false)) => ErrorKind::VersionUnsupported,
            _ => ErrorKind::NotPresent,
        };
        self.update_state(|state| {
            state.present = present;
            state.error = error;
            if !present {
                state.installed_version = None;
            }
        });

        if error == ErrorKind::None {
            return Ok(true);
        }

        self.show_install_prompt(error)?;
        Ok(false)
    }

    /// Message shown for a failed gate check
    pub fn prompt_message(&self, error: ErrorKind) -> String {
        let display = self.product.display_name();
        let minimum = self.product.min_version();
        match error {
            ErrorKind::VersionUnsupported => {
                let installed = self
                    .installation_state()
                    .installed_version
                    .unwrap_or_else(|| "unknown".to_string());
                format!(
                    "The installed {} version {} is not supported. Install version {} or newer, or update the SDK location in the settings.",
                    display, installed, minimum
                )
            }
            _ => format!(
                "The {} was not found. Install version {} or newer, or update the SDK location in the settings.",
                display, minimum
            ),
        }
    }

    /// Download page for the pinned `major.minor` release line
    pub fn install_page_url(&self) -> anyhow::Result<Url> {
        let base = Url::parse(self.product.download_base_url())?;
        let line = version::release_line(self.product.min_version()).ok_or_else(|| {
            anyhow::anyhow!("Invalid minimum version: {}", self.product.min_version())
        })?;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .push(&line);
        Ok(url)
    }

    /// Ask the user how to fix a failed gate check and carry out the choice
    pub fn show_install_prompt(&self, error: ErrorKind) -> Result<Option<PromptAction>> {
        let message = self.prompt_message(error);
        let choice = self
            .prompter
            .choose(&message, &PromptAction::ALL)
            .map_err(|e| SdkError::Prompt(format!("{:#}", e)))?;

        match choice {
            Some(PromptAction::OpenSettings) => {
                let location = self.settings.location();
                if let Err(e) = self.prompter.open_settings(location.as_deref()) {
                    log::warn!("{:#}", e);
                }
            }
            Some(PromptAction::OpenInstallPage) => {
                match self.install_page_url() {
                    Ok(url) => {
                        if let Err(e) = self.prompter.open_url(url.as_str()) {
                            log::warn!("{:#}", e);
                        }
                    }
                    Err(e) => log::warn!("{:#}", e),
                }
            }
            Some(PromptAction::DoNotAskAgain) => {
                self.settings.set_do_not_ask_again(true)?;
                log::info!("Install prompt disabled for {}", self.product.name());
            }
            None => log::debug!("Install prompt dismissed"),
        }
        Ok(choice)
    }

    /// Run an SDK command, streaming output to the locator's sink
    ///
    /// Fails with [`SdkError::ToolNotPresent`] or [`SdkError::VersionUnsupported`]
    /// when the gate does not pass.
    pub async fn run_command(&self, options: &CommandOptions) -> Result<String> {
        if !self.ensure_available().await? {
            let state = self.installation_state();
            return Err(match state.error {
                ErrorKind::VersionUnsupported => SdkError::VersionUnsupported {
                    name: self.product.display_name().to_string(),
                    version: state
                        .installed_version
                        .unwrap_or_else(|| "unknown".to_string()),
                    minimum: self.product.min_version().to_string(),
                },
                _ => SdkError::ToolNotPresent {
                    name: self.product.display_name().to_string(),
                },
            });
        }

        // With the gate disabled the SDK may not be locatable; fall back to PATH.
        let executable = self
            .executable_path()
            .map(|p| process::quote_path(&p))
            .unwrap_or_else(|| self.executable_name());
        let command_line = match options.argument.as_deref() {
            Some(argument) if !argument.is_empty() => format!("{} {}", executable, argument),
            _ => executable,
        };

        process::run_streamed(&command_line, self.sink.as_ref(), options).await
    }
}
