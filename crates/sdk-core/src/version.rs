//! Version parsing and minimum-version checks

use anyhow::Result;
use semver::Version;

/// Minimum SDK version supported out of the box
pub const MIN_SUPPORTED_VERSION: &str = "3.1.0";

/// Parse version string, handling various formats
///
/// Accepts a leading `v`, surrounding whitespace and `major.minor` strings
/// (padded with a `.0` patch component).
pub fn parse_version(version_str: &str) -> Result<Version> {
    let trimmed = version_str.trim();
    let cleaned = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if let Ok(v) = Version::parse(cleaned) {
        return Ok(v);
    }
    let parts: Vec<&str> = cleaned.split('.').collect();
    if parts.len() == 2 && parts.iter().all(|p| p.parse::<u64>().is_ok()) {
        return Version::parse(&format!("{}.0", cleaned))
            .map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e));
    }
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

/// Whether `installed` is at or above `minimum`
///
/// An unparsable installed version never meets the minimum.
pub fn meets_minimum(installed: &str, minimum: &str) -> bool {
    let installed = match parse_version(installed) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("{}", e);
            return false;
        }
    };
    let minimum = match parse_version(minimum) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{}", e);
            return false;
        }
    };
    installed >= minimum
}

/// `major.minor` release line of a version, used for download links
pub fn release_line(version_str: &str) -> Option<String> {
    parse_version(version_str)
        .ok()
        .map(|v| format!("{}.{}", v.major, v.minor))
}
