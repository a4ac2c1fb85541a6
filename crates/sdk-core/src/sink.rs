//! Output sinks receiving streamed command output

use colored::Colorize;
use std::sync::Mutex;

/// Append-only, line-oriented text surface shared by every streamed command
pub trait OutputSink: Send + Sync {
    /// Append one line of text
    fn append_line(&self, line: &str);

    /// Bring the output surface to the front
    fn reveal(&self);
}

/// Sink that writes to the terminal
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for ConsoleSink {
    fn append_line(&self, line: &str) {
        if let Some(rest) = line.strip_prefix("stderr:") {
            eprintln!("{}{}", "stderr:".yellow(), rest.yellow());
        } else if line.starts_with("    >") || line.starts_with(">>>") {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    fn reveal(&self) {
        println!();
    }
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    reveals: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of times `reveal` was called
    pub fn reveal_count(&self) -> usize {
        self.reveals.lock().map(|n| *n).unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn append_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }

    fn reveal(&self) {
        if let Ok(mut n) = self.reveals.lock() {
            *n += 1;
        }
    }
}
