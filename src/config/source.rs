//! Source resolver
//!
//! Works out which directory a cycle mirrors. An explicit path always wins;
//! otherwise the OneDrive root is taken from the `OneDrive` environment
//! variable (set for personal and business accounts alike) and finally from
//! `<home>/OneDrive`.

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::SnapError;

/// Environment variable pointing at the OneDrive root
pub const ONEDRIVE_ENV: &str = "OneDrive";

/// Resolve the source directory from the process environment
pub fn resolve_source(explicit: Option<PathBuf>) -> Result<PathBuf, SnapError> {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    resolve_source_with(explicit, |key| std::env::var_os(key).map(PathBuf::from), home)
}

/// Resolve the source directory with an injected environment lookup
pub fn resolve_source_with<F>(
    explicit: Option<PathBuf>,
    env: F,
    home: Option<PathBuf>,
) -> Result<PathBuf, SnapError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    if let Some(path) = explicit {
        return Ok(path);
    }

    if let Some(path) = env(ONEDRIVE_ENV).filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }

    home.map(|h| h.join("OneDrive")).ok_or_else(|| {
        SnapError::Config("Could not determine the source directory; pass --source".into())
    })
}
