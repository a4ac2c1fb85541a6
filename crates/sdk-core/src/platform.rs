//! Platform detection and default SDK install locations

use crate::product::SdkProduct;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variables consulted on Windows, in order of preference
const WINDOWS_PROGRAM_DIRS: &[&str] = &["ProgramW6432", "ProgramFiles(x86)", "ProgramFiles"];

/// System-wide install root on Unix-like platforms
const UNIX_SHARE_DIR: &str = "/usr/local/share";

/// Supported host platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Other => "unknown",
        }
    }

    /// Executable file name for a tool base name (`name.exe` on Windows)
    pub fn executable_name(&self, base: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", base),
            _ => base.to_string(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Candidate install directories for a product, in the order they are tried.
///
/// `env` resolves environment variables and `home` is the user's home
/// directory; both are passed in so the table stays free of global state.
pub fn default_candidates<P, E>(
    platform: Platform,
    product: &P,
    env: E,
    home: Option<&Path>,
) -> Vec<PathBuf>
where
    P: SdkProduct,
    E: Fn(&str) -> Option<String>,
{
    match platform {
        Platform::Windows => WINDOWS_PROGRAM_DIRS
            .iter()
            .filter_map(|&var| env(var))
            .filter(|value| !value.is_empty())
            .map(|value| PathBuf::from(value).join(product.install_dir_name()))
            .collect(),
        Platform::Linux | Platform::MacOs => {
            let mut candidates = vec![PathBuf::from(UNIX_SHARE_DIR).join(product.install_dir_name())];
            if let Some(home) = home {
                candidates.push(home.join(product.user_install_dir_name()));
            }
            candidates
        }
        Platform::Other => Vec::new(),
    }
}

/// First candidate directory that contains `executable`, according to `exists`
pub fn first_installed<F>(candidates: &[PathBuf], executable: &str, exists: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    candidates
        .iter()
        .find(|dir| exists(&dir.join(executable)))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::testing::TestSdk;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_windows_candidates_follow_env_order() {
        let env = env_from(&[
            ("ProgramFiles", r"C:\PF"),
            ("ProgramW6432", r"C:\PF64"),
            ("ProgramFiles(x86)", r"C:\PF86"),
        ]);
        let candidates = default_candidates(Platform::Windows, &TestSdk, env, None);
        assert_eq!(
            candidates,
            vec![
                PathBuf::from(r"C:\PF64").join("testsdk"),
                PathBuf::from(r"C:\PF86").join("testsdk"),
                PathBuf::from(r"C:\PF").join("testsdk"),
            ]
        );
    }

    #[test]
    fn test_windows_candidates_skip_unset_vars() {
        let env = env_from(&[("ProgramFiles", r"C:\PF"), ("ProgramW6432", "")]);
        let candidates = default_candidates(Platform::Windows, &TestSdk, env, None);
        assert_eq!(candidates, vec![PathBuf::from(r"C:\PF").join("testsdk")]);
    }

    #[test]
    fn test_unix_candidates_share_then_home() {
        let home = PathBuf::from("/home/alice");
        for platform in [Platform::Linux, Platform::MacOs] {
            let candidates = default_candidates(platform, &TestSdk, env_from(&[]), Some(&home));
            assert_eq!(
                candidates,
                vec![
                    PathBuf::from("/usr/local/share/testsdk"),
                    PathBuf::from("/home/alice/.testsdk"),
                ]
            );
        }
    }

    #[test]
    fn test_unknown_platform_has_no_candidates() {
        let home = PathBuf::from("/home/alice");
        let candidates = default_candidates(Platform::Other, &TestSdk, env_from(&[]), Some(&home));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_first_installed_uses_predicate() {
        let candidates = vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")];
        let found = first_installed(&candidates, "tool", |p| {
            p == Path::new("/b/tool") || p == Path::new("/c/tool")
        });
        assert_eq!(found, Some(PathBuf::from("/b")));

        let none = first_installed(&candidates, "tool", |_| false);
        assert!(none.is_none());
    }

    #[test]
    fn test_executable_name() {
        assert_eq!(Platform::Windows.executable_name("dotnet"), "dotnet.exe");
        assert_eq!(Platform::Linux.executable_name("dotnet"), "dotnet");
        assert_eq!(Platform::MacOs.executable_name("dotnet"), "dotnet");
    }
}
