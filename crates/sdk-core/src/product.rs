//! Product configuration trait for SDK binaries
//!
//! This trait defines the interface that each SDK product (e.g. the .NET SDK)
//! must implement to configure discovery, version gating and the install prompt.

use crate::platform::Platform;

/// Configuration trait for different SDK products
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Install directory layout used for default path discovery
/// - Minimum supported version and download page
/// - Settings namespace and environment overrides
pub trait SdkProduct: Clone + Send + Sync + 'static {
    /// Base name of the SDK executable (e.g., "dotnet")
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Directory name the SDK installs into under system locations
    /// (e.g., `C:\Program Files\dotnet`, `/usr/local/share/dotnet`)
    fn install_dir_name(&self) -> &'static str;

    /// Directory name used for per-user installs under the home directory
    fn user_install_dir_name(&self) -> &'static str;

    /// Minimum supported SDK version (semver)
    fn min_version(&self) -> &'static str;

    /// Base URL of the download page; the pinned `major.minor` is appended
    fn download_base_url(&self) -> &'static str;

    /// Root key in the settings document holding this product's settings
    fn settings_namespace(&self) -> &'static str;

    /// Environment variable name for overriding the settings file location
    fn settings_path_env(&self) -> &'static str;

    /// Executable file name on the given platform
    fn executable_name(&self, platform: Platform) -> String {
        platform.executable_name(self.name())
    }
}
