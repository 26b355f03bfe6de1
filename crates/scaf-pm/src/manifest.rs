//! Package manifest parsing (scaf.toml)
//!
//! Reads the narrow slice of a package manifest this tool cares about: the
//! package identity and its declared entry point. Helper packages may carry
//! more fields; they are ignored here.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Manifest file name looked up at or above a package root.
pub const MANIFEST_FILE: &str = "scaf.toml";

/// Errors that can occur during manifest parsing
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Package manifest (scaf.toml)
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Package metadata
    pub package: PackageInfo,
}

/// Package information
#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,

    /// Semver version
    pub version: String,

    /// Entry point, relative to the manifest's directory
    pub main: Option<String>,
}

impl PackageManifest {
    /// Parse a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from a string
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }
}
