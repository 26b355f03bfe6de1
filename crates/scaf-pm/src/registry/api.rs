//! Registry API types
//!
//! Response types for the scaf helper-package registry API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Package metadata from registry
///
/// Response from GET /packages/{name}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,

    /// Package description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// List of published versions
    pub versions: Vec<String>,

    /// Named version tags ("latest", "next", ...)
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,

    /// Time when package was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Version information from registry
///
/// Response from GET /packages/{name}/{version}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Package name
    pub name: String,

    /// Version number
    pub version: String,

    /// SHA-256 checksum of the package archive
    pub checksum: String,

    /// Download information
    pub download: VersionDownload,

    /// Time when this version was published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    /// Size of the package archive in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Download information for a package version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDownload {
    /// Download URL for the package archive
    pub url: String,

    /// Alternative download URLs (mirrors)
    #[serde(default)]
    pub mirrors: Vec<String>,
}

/// Project template entry
///
/// Response element from GET /templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    /// Human-readable template name
    pub name: String,

    /// Backing package name on the registry
    pub package: String,

    /// Version to install
    pub version: String,
}
