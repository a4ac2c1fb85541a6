//! SDK Core - Shared library for SDK-backed CLIs
//!
//! This library locates an external SDK, gates commands on its presence and
//! version, and runs SDK commands with their output streamed to a sink. It is
//! designed to be used by product binaries (e.g. `dotnet-tools`) that share
//! the same logic but describe a different SDK.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Platform path table, version parsing, line
//!   splitting and streamed process execution
//! - **Layer 2: Workflow Orchestration** - `SdkProduct` trait and `SdkLocator`
//!   (discovery, gate, install prompt, command execution)
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompter (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based install prompt
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use sdk_core::{CommandOptions, ConsoleSink, DismissingPrompter, FileSettings, SdkLocator};
//! use std::sync::Arc;
//!
//! let locator = SdkLocator::new(
//!     MySdk,
//!     Arc::new(FileSettings::from_product(&MySdk)),
//!     Arc::new(DismissingPrompter),
//!     Arc::new(ConsoleSink::new()),
//! );
//! let stdout = locator.run_command(&CommandOptions::new().argument("build")).await?;
//! ```

pub mod config;
pub mod error;
pub mod locator;
pub mod platform;
pub mod process;
pub mod product;
pub mod prompt;
pub mod sink;
pub mod version;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{FileSettings, MemorySettings, ProductSettings, SettingsStore};
pub use error::SdkError;
pub use locator::{ErrorKind, InstallationState, SdkLocator};
pub use platform::Platform;
pub use process::{
    join_args, quote_arg, run_streamed, CommandOptions, ProcessOutcome, MAX_OUTPUT_BYTES,
};
pub use product::SdkProduct;
pub use prompt::{DismissingPrompter, PromptAction, Prompter};
pub use sink::{ConsoleSink, MemorySink, OutputSink};
pub use version::MIN_SUPPORTED_VERSION;

#[cfg(feature = "tui")]
pub use tui::CliPrompter;
