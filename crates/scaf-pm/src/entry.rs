//! Entry-point resolution
//!
//! Locates the manifest governing a package tree and resolves the entry
//! file it declares, normalized to forward-slash separators regardless of
//! the host OS.

use crate::manifest::{ManifestError, PackageManifest, MANIFEST_FILE};
use std::path::{Path, PathBuf};

/// Nearest directory at or above `base` containing a scaf.toml
pub fn find_package_dir(base: &Path) -> Option<PathBuf> {
    let mut current = base;

    loop {
        if current.join(MANIFEST_FILE).is_file() {
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}

/// Entry file declared by the manifest governing `base`
///
/// Returns `Ok(None)` when no manifest is found or the manifest declares no
/// entry point; absence is a normal result, not an error. Only an unreadable
/// or unparseable manifest is an error.
pub fn entry_file(base: &Path) -> Result<Option<PathBuf>, ManifestError> {
    let dir = match find_package_dir(base) {
        Some(dir) => dir,
        None => return Ok(None),
    };

    let manifest = PackageManifest::from_file(&dir.join(MANIFEST_FILE))?;

    match manifest.package.main {
        Some(main) => Ok(Some(platform_neutral(&dir.join(main)))),
        None => Ok(None),
    }
}

/// Render a path with `/` separators regardless of host conventions
pub fn platform_neutral(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace('\\', "/"))
}
