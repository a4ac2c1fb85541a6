//! Streamed execution of shell command lines
//!
//! Commands run through the platform shell with stdout and stderr piped.
//! Every line is forwarded to an [`OutputSink`] as it arrives, while stdout is
//! also buffered and returned to the caller once the process has exited.

pub mod lines;

use crate::error::{Result, SdkError};
use crate::sink::OutputSink;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

pub use lines::LineSplitter;

/// Ceiling on combined stdout + stderr bytes for one streamed command (10 MiB)
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Read buffer size for each output stream
const READ_CHUNK: usize = 8 * 1024;

/// Per-invocation options for a streamed command
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Directory the command runs in (defaults to the current directory)
    pub working_directory: Option<PathBuf>,
    /// Variables merged over the inherited environment; these win on conflict
    pub extra_env: Option<HashMap<String, String>>,
    /// Label shown in the output header instead of the raw command line
    pub title: Option<String>,
    /// Arguments appended to the SDK executable by `SdkLocator::run_command`
    pub argument: Option<String>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// How a child process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited { code: i32 },
    Signaled { name: String },
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ProcessOutcome::Exited { code: 0 })
    }

    /// Terminal line written to the sink once a command finishes
    pub fn describe(&self, command_line: &str) -> String {
        match self {
            ProcessOutcome::Exited { code } => {
                format!(">>> {} ... exited with code: {}", command_line, code)
            }
            ProcessOutcome::Signaled { name } => {
                format!(">>> {} ... exited with signal: {}", command_line, name)
            }
        }
    }
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ProcessOutcome::Exited { code };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ProcessOutcome::Signaled {
                    name: signal_name(signal),
                };
            }
        }
        ProcessOutcome::Exited { code: -1 }
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Exited { code } => write!(f, "exit code {}", code),
            ProcessOutcome::Signaled { name } => write!(f, "signal {}", name),
        }
    }
}

#[cfg(unix)]
fn signal_name(signal: i32) -> String {
    let name = match signal {
        1 => "SIGHUP",
        2 => "SIGINT",
        3 => "SIGQUIT",
        4 => "SIGILL",
        6 => "SIGABRT",
        8 => "SIGFPE",
        9 => "SIGKILL",
        11 => "SIGSEGV",
        13 => "SIGPIPE",
        14 => "SIGALRM",
        15 => "SIGTERM",
        _ => return format!("SIG{}", signal),
    };
    name.to_string()
}

/// Build a shell command for `command_line` on the current platform
#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

/// Build a shell command for `command_line` on the current platform
///
/// cmd.exe does not understand the backslash escapes `Command::arg` would add
/// to embedded quotes, so the line is passed raw. `/S` plus an outer pair of
/// quotes makes cmd strip exactly those outer quotes and keep the rest intact.
#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command
        .args(["/S", "/C"])
        .raw_arg(format!("\"{}\"", command_line));
    command
}

/// Quote a path for use as the program of a shell command line
pub fn quote_path(path: &Path) -> String {
    quote_arg(&path.display().to_string())
}

/// Quote one argument so the platform shell passes it through as a single word
#[cfg(not(windows))]
pub fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-+=@%:,./".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Quote one argument so the platform shell passes it through as a single word
#[cfg(windows)]
pub fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || "\"&|<>^()%!,;=".contains(c));
    if needs_quotes {
        format!("\"{}\"", arg.replace('"', "\"\""))
    } else {
        arg.to_string()
    }
}

/// Join already-split arguments into one shell command line fragment
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command line through the shell and capture its output without streaming
pub async fn run_captured(command_line: &str) -> std::io::Result<Output> {
    shell_command(command_line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
}

/// Run a command line, streaming its output to `sink` and returning stdout
///
/// Non-zero exit codes are reported on the sink only; the call still resolves
/// with whatever stdout was produced. Exceeding [`MAX_OUTPUT_BYTES`] kills the
/// process and fails with [`SdkError::OutputBufferExceeded`].
pub async fn run_streamed(
    command_line: &str,
    sink: &dyn OutputSink,
    options: &CommandOptions,
) -> Result<String> {
    run_streamed_with_limit(command_line, sink, options, MAX_OUTPUT_BYTES).await
}

pub(crate) async fn run_streamed_with_limit(
    command_line: &str,
    sink: &dyn OutputSink,
    options: &CommandOptions,
    limit: usize,
) -> Result<String> {
    sink.reveal();
    sink.append_line(&format!(
        "    > {}",
        options.title.as_deref().unwrap_or(command_line)
    ));

    let mut command = shell_command(command_line);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &options.working_directory {
        command.current_dir(dir);
    }
    if let Some(env) = &options.extra_env {
        command.envs(env);
    }

    log::debug!("Spawning: {}", command_line);
    let mut child = command.spawn().map_err(|e| SdkError::SpawnFailure {
        command: command_line.to_string(),
        message: e.to_string(),
    })?;

    let missing_pipe = |name: &str| SdkError::SpawnFailure {
        command: command_line.to_string(),
        message: format!("{} was not captured", name),
    };
    let mut stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let mut stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    let mut stdout_buf = vec![0u8; READ_CHUNK];
    let mut stderr_buf = vec![0u8; READ_CHUNK];
    let mut stdout_lines = LineSplitter::new();
    let mut stderr_lines = LineSplitter::new();
    let mut captured: Vec<u8> = Vec::new();
    let mut total = 0usize;
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            read = stdout.read(&mut stdout_buf), if stdout_open => {
                let n = read?;
                if n == 0 {
                    stdout_open = false;
                    if let Some(line) = stdout_lines.finish() {
                        sink.append_line(&format!("stdout: {}", line));
                    }
                    continue;
                }
                total += n;
                if total > limit {
                    return Err(abort_oversized(&mut child, sink, command_line, limit).await);
                }
                captured.extend_from_slice(&stdout_buf[..n]);
                for line in stdout_lines.push(&stdout_buf[..n]) {
                    sink.append_line(&format!("stdout: {}", line));
                }
            }
            read = stderr.read(&mut stderr_buf), if stderr_open => {
                let n = read?;
                if n == 0 {
                    stderr_open = false;
                    if let Some(line) = stderr_lines.finish() {
                        sink.append_line(&format!("stderr: {}", line));
                    }
                    continue;
                }
                total += n;
                if total > limit {
                    return Err(abort_oversized(&mut child, sink, command_line, limit).await);
                }
                for line in stderr_lines.push(&stderr_buf[..n]) {
                    sink.append_line(&format!("stderr: {}", line));
                }
            }
        }
    }

    let outcome = ProcessOutcome::from(child.wait().await?);
    log::debug!("'{}' finished with {}", command_line, outcome);
    sink.append_line(&outcome.describe(command_line));

    Ok(String::from_utf8_lossy(&captured).into_owned())
}

async fn abort_oversized(
    child: &mut Child,
    sink: &dyn OutputSink,
    command_line: &str,
    limit: usize,
) -> SdkError {
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill '{}': {}", command_line, e);
    }
    sink.append_line(&format!(
        ">>> {} ... stopped: output exceeded {} bytes",
        command_line, limit
    ));
    SdkError::OutputBufferExceeded { limit }
}


#[cfg(all(test, windows))]
mod windows_tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("build"), "build");
        assert_eq!(quote_arg("My Project.sqlproj"), "\"My Project.sqlproj\"");
        assert_eq!(quote_arg("a&b"), "\"a&b\"");
    }

    #[tokio::test]
    async fn test_quoted_program_path_with_space_runs() {
        let dir = tempfile::tempdir().unwrap();
        let sdk_dir = dir.path().join("Program Files").join("sdk");
        std::fs::create_dir_all(&sdk_dir).unwrap();
        let exe = sdk_dir.join("tool.cmd");
        std::fs::write(&exe, "@echo v=%1\r\n").unwrap();

        let command_line = format!("{} --version", quote_path(&exe));
        let output = run_captured(&command_line).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "v=--version");

        let sink = MemorySink::new();
        let result = run_streamed(&command_line, &sink, &CommandOptions::new())
            .await
            .unwrap();
        assert_eq!(result.trim(), "v=--version");
        assert!(sink.lines().last().unwrap().ends_with("exited with code: 0"));
    }
}
