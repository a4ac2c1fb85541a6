//! Installation state recorded by the SDK gate

use std::fmt;

/// Why the last gate check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    #[default]
    None,
    NotPresent,
    VersionUnsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::None => "none",
            ErrorKind::NotPresent => "not present",
            ErrorKind::VersionUnsupported => "version unsupported",
        };
        write!(f, "{}", text)
    }
}

/// Snapshot of the most recent installation check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationState {
    pub present: bool,
    pub installed_version: Option<String>,
    pub error: ErrorKind,
}

impl InstallationState {
    pub fn is_ok(&self) -> bool {
        self.error == ErrorKind::None
    }
}
