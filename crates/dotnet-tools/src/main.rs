//! dotnet-tools CLI - Locate the .NET SDK and run dotnet commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sdk_core::{
    CliPrompter, CommandOptions, ConsoleSink, DismissingPrompter, ErrorKind, FileSettings,
    OutputSink, Prompter, SdkLocator, SdkProduct, SettingsStore,
};
use std::path::PathBuf;
use std::sync::Arc;

/// .NET SDK product configuration
#[derive(Clone)]
pub struct DotnetSdk;

impl SdkProduct for DotnetSdk {
    fn name(&self) -> &'static str {
        "dotnet"
    }

    fn display_name(&self) -> &'static str {
        ".NET Core SDK"
    }

    fn install_dir_name(&self) -> &'static str {
        "dotnet"
    }

    fn user_install_dir_name(&self) -> &'static str {
        ".dotnet"
    }

    fn min_version(&self) -> &'static str {
        sdk_core::MIN_SUPPORTED_VERSION
    }

    fn download_base_url(&self) -> &'static str {
        "https://dotnet.microsoft.com/download/dotnet-core"
    }

    fn settings_namespace(&self) -> &'static str {
        "projects"
    }

    fn settings_path_env(&self) -> &'static str {
        "DOTNET_TOOLS_SETTINGS"
    }
}

#[derive(Parser, Debug)]
#[command(name = "dotnet-tools")]
#[command(about = "Locate the .NET SDK and run dotnet commands")]
#[command(version)]
pub struct Args {
    /// Never prompt; a missing or unsupported SDK just fails the command
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that a supported SDK is installed
    Check,
    /// Print the SDK installation directory
    Locate,
    /// Run a dotnet command, e.g. `dotnet-tools run -- build MyProject.sqlproj`
    Run(RunArgs),
    /// Run an arbitrary shell command line with streamed output (no SDK check)
    Exec(ExecArgs),
    /// Show or change persisted settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Working directory for the command
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variables (KEY=VALUE), may be repeated
    #[arg(short, long = "env", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Title shown in the output header
    #[arg(long)]
    pub title: Option<String>,

    /// Arguments passed to dotnet
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RunArgs {
    fn options(&self, argument: Option<String>) -> CommandOptions {
        let mut options = CommandOptions::new();
        options.argument = argument;
        options.title = self.title.clone();
        options.working_directory = self.cwd.clone();
        for (key, value) in &self.env {
            options = options.env(key, value);
        }
        options
    }
}

#[derive(Parser, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the settings file location and values
    Show,
    /// Set the SDK install directory override
    SetLocation { path: PathBuf },
    /// Remove the SDK install directory override
    ClearLocation,
    /// Re-enable the install prompt after "Don't ask again"
    ResetPrompt,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Command line for `exec`: one argument is taken as a full command line,
/// several are quoted word by word
fn exec_command_line(args: &[String]) -> Option<String> {
    match args {
        [] => None,
        [line] => Some(line.clone()),
        words => Some(sdk_core::join_args(words)),
    }
}

fn build_locator(yes: bool, settings: Arc<FileSettings>) -> SdkLocator<DotnetSdk> {
    let prompter: Arc<dyn Prompter> = if yes {
        Arc::new(DismissingPrompter)
    } else {
        Arc::new(CliPrompter::new())
    };
    let sink: Arc<dyn OutputSink> = Arc::new(ConsoleSink::new());
    SdkLocator::new(DotnetSdk, settings, prompter, sink)
}

async fn check(locator: &SdkLocator<DotnetSdk>) -> Result<()> {
    let available = locator.ensure_available().await?;
    let state = locator.installation_state();

    if available {
        let version = state.installed_version.as_deref().unwrap_or("unchecked");
        let location = locator
            .locate_installation()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "PATH".to_string());
        println!(
            "{} {} {} ({})",
            "✓".green(),
            locator.product().display_name(),
            version,
            location
        );
        return Ok(());
    }

    let detail = match state.error {
        ErrorKind::VersionUnsupported => format!(
            "version {} is below {}",
            state.installed_version.as_deref().unwrap_or("unknown"),
            locator.product().min_version()
        ),
        _ => "not found".to_string(),
    };
    eprintln!(
        "{} {} {}",
        "✗".red(),
        locator.product().display_name(),
        detail
    );
    std::process::exit(1);
}

fn settings_command(command: SettingsCommand, settings: &FileSettings) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let values = settings.load()?;
            println!("{} {}", "Settings file:".dimmed(), settings.path().display());
            println!(
                "  sdkLocation:   {}",
                values
                    .sdk_location
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(default locations)".to_string())
            );
            println!("  doNotAskAgain: {}", values.do_not_ask_again);
        }
        SettingsCommand::SetLocation { path } => {
            let path = if path.is_absolute() {
                path
            } else {
                std::env::current_dir()
                    .context("Failed to resolve current directory")?
                    .join(path)
            };
            settings.set_install_location(Some(path.clone()))?;
            println!("{} {}", "SDK location set to".green(), path.display());
        }
        SettingsCommand::ClearLocation => {
            settings.set_install_location(None)?;
            println!("{}", "SDK location cleared".green());
        }
        SettingsCommand::ResetPrompt => {
            settings.set_do_not_ask_again(false)?;
            println!("{}", "Install prompt re-enabled".green());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let settings = Arc::new(FileSettings::from_product(&DotnetSdk));
    log::debug!("Using settings file {}", settings.path().display());

    match args.command {
        Command::Check => check(&build_locator(args.yes, settings)).await,
        Command::Locate => {
            let locator = build_locator(args.yes, settings);
            match locator.locate_installation() {
                Some(dir) => {
                    println!("{}", dir.display());
                    Ok(())
                }
                None => {
                    eprintln!("{}", "No .NET SDK installation found".red());
                    std::process::exit(1);
                }
            }
        }
        Command::Run(run_args) => {
            let locator = build_locator(args.yes, settings);
            let argument =
                (!run_args.args.is_empty()).then(|| sdk_core::join_args(&run_args.args));
            locator.run_command(&run_args.options(argument)).await?;
            Ok(())
        }
        Command::Exec(exec_args) => {
            let Some(command_line) = exec_command_line(&exec_args.run.args) else {
                anyhow::bail!("No command line given");
            };
            let sink = ConsoleSink::new();
            sdk_core::run_streamed(&command_line, &sink, &exec_args.run.options(None)).await?;
            Ok(())
        }
        Command::Settings(command) => settings_command(command, &settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_key_val("EMPTY=").unwrap(), ("EMPTY".to_string(), String::new()));
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_run_args_parse() {
        let args = Args::parse_from([
            "dotnet-tools",
            "run",
            "--cwd",
            "/work",
            "-e",
            "A=1",
            "--",
            "build",
            "-c",
            "Release",
        ]);
        match args.command {
            Command::Run(run) => {
                let options = run.options(Some(sdk_core::join_args(&run.args)));
                assert_eq!(options.argument.as_deref(), Some("build -c Release"));
                assert_eq!(options.working_directory, Some(PathBuf::from("/work")));
                assert_eq!(
                    options.extra_env.unwrap().get("A").map(String::as_str),
                    Some("1")
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_args_keep_spaced_project_as_one_word() {
        let args = Args::parse_from([
            "dotnet-tools",
            "run",
            "--",
            "build",
            "My Project.sqlproj",
        ]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(
                    sdk_core::join_args(&run.args),
                    "build 'My Project.sqlproj'"
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_command_line() {
        assert_eq!(exec_command_line(&[]), None);
        assert_eq!(
            exec_command_line(&["echo a && echo b".to_string()]).as_deref(),
            Some("echo a && echo b")
        );
        assert_eq!(
            exec_command_line(&["ls".to_string(), "My Dir".to_string()]).as_deref(),
            Some("ls 'My Dir'")
        );
    }

    #[test]
    fn test_install_page_points_at_release_line() {
        let locator = SdkLocator::new(
            DotnetSdk,
            Arc::new(sdk_core::MemorySettings::default()),
            Arc::new(DismissingPrompter),
            Arc::new(sdk_core::MemorySink::new()),
        );
        assert_eq!(
            locator.install_page_url().unwrap().as_str(),
            "https://dotnet.microsoft.com/download/dotnet-core/3.1"
        );
    }

    #[test]
    fn test_executable_name_per_platform() {
        assert_eq!(DotnetSdk.executable_name(sdk_core::Platform::Windows), "dotnet.exe");
        assert_eq!(DotnetSdk.executable_name(sdk_core::Platform::Linux), "dotnet");
    }
}
