//! Charm-style install prompt using cliclack

use crate::prompt::{ensure_file, PromptAction, Prompter};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Interactive prompter backed by cliclack's select prompt
#[derive(Debug, Default)]
pub struct CliPrompter;

impl CliPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for CliPrompter {
    fn choose(&self, message: &str, actions: &[PromptAction]) -> Result<Option<PromptAction>> {
        cliclack::log::warning(message)?;

        let mut select = cliclack::select("What would you like to do?");
        for action in actions {
            select = select.item(Some(*action), action.label(), "");
        }
        select = select.item(None, "Dismiss", "");

        match select.interact() {
            Ok(choice) => Ok(choice),
            // Esc / Ctrl+C on the prompt counts as dismissing it
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn open_url(&self, url: &str) -> Result<()> {
        println!("{}", format!("Opening {} in your browser...", url).cyan());
        open::that(url)?;
        Ok(())
    }

    fn open_settings(&self, location: Option<&Path>) -> Result<()> {
        let Some(path) = location else {
            anyhow::bail!("Settings have no on-disk location");
        };
        ensure_file(path)?;
        println!("{}", format!("Opening settings at {}...", path.display()).cyan());
        open::that(path)?;
        Ok(())
    }
}
