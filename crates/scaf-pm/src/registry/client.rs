//! Registry HTTP client
//!
//! Provides a blocking HTTP client for the scaf helper-package registry.

use super::api::{PackageMetadata, TemplateInfo, VersionInfo};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default registry URL
pub const DEFAULT_REGISTRY: &str = "https://pkg.scaf.dev/api/v1";

/// Errors that can occur during registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Package not found
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// Version not found
    #[error("Version {version} not found for package {package}")]
    VersionNotFound { package: String, version: String },

    /// Package has no published versions
    #[error("No published versions for package: {0}")]
    NoVersions(String),

    /// Checksum mismatch
    #[error("Checksum mismatch for {package}@{version}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        package: String,
        version: String,
        expected: String,
        actual: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Archive extraction failed
    #[error("Failed to extract archive: {0}")]
    ExtractionError(String),

    /// Registry unavailable
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// Registry operations the package cache depends on.
///
/// `latest_version` is read-only and idempotent; `install_into` is the only
/// operation that writes to disk, and must be safe to call when the
/// destination already exists.
pub trait Registry {
    /// Most recent published version of `name`.
    fn latest_version(&self, name: &str) -> Result<String, RegistryError>;

    /// Materialize `name@version` as a directory tree at `dest`, replacing
    /// any existing tree there.
    fn install_into(&self, name: &str, version: &str, dest: &Path) -> Result<(), RegistryError>;
}

/// Project template listing consumed by the init command.
pub trait TemplateSource {
    /// Templates currently published on the registry.
    fn project_templates(&self) -> Result<Vec<TemplateInfo>, RegistryError>;
}

/// Blocking HTTP client for a scaf registry
pub struct HttpRegistry {
    /// HTTP client
    client: Client,

    /// Base URL for the registry
    base_url: String,
}

impl HttpRegistry {
    /// Create a new registry client with the default URL
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_url(DEFAULT_REGISTRY)
    }

    /// Create a new registry client with a custom URL
    pub fn with_url(base_url: &str) -> Result<Self, RegistryError> {
        url::Url::parse(base_url)
            .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("scaf/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Configured base registry URL (no network call)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get package metadata
    ///
    /// GET /packages/{name}
    pub fn get_package(&self, name: &str) -> Result<PackageMetadata, RegistryError> {
        let url = format!("{}/packages/{}", self.base_url, encode_package_name(name));

        let response = self.client.get(&url).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound(name.to_string()));
        }

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "Registry returned status {}",
                response.status()
            )));
        }

        let metadata: PackageMetadata = response.json()?;
        Ok(metadata)
    }

    /// Get version information
    ///
    /// GET /packages/{name}/{version}
    pub fn get_version(&self, name: &str, version: &str) -> Result<VersionInfo, RegistryError> {
        let url = format!(
            "{}/packages/{}/{}",
            self.base_url,
            encode_package_name(name),
            version
        );

        let response = self.client.get(&url).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::VersionNotFound {
                package: name.to_string(),
                version: version.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "Registry returned status {}",
                response.status()
            )));
        }

        let info: VersionInfo = response.json()?;
        Ok(info)
    }

    /// Download raw bytes from a URL
    fn download_url(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "Download failed with status {}",
                response.status()
            )));
        }

        let bytes = response.bytes()?.to_vec();
        Ok(bytes)
    }

    /// Extract a tar.gz archive to a directory
    fn extract_archive(&self, archive_bytes: &[u8], target_dir: &Path) -> Result<(), RegistryError> {
        use flate2::read::GzDecoder;
        use tar::Archive;

        let decoder = GzDecoder::new(archive_bytes);
        let mut archive = Archive::new(decoder);

        archive
            .unpack(target_dir)
            .map_err(|e| RegistryError::ExtractionError(e.to_string()))?;

        Ok(())
    }
}

impl Registry for HttpRegistry {
    fn latest_version(&self, name: &str) -> Result<String, RegistryError> {
        let metadata = self.get_package(name)?;

        if let Some(tagged) = metadata.dist_tags.get("latest") {
            return Ok(tagged.clone());
        }

        highest_version(&metadata.versions)
            .ok_or_else(|| RegistryError::NoVersions(name.to_string()))
    }

    fn install_into(&self, name: &str, version: &str, dest: &Path) -> Result<(), RegistryError> {
        let info = self.get_version(name, version)?;

        let archive_bytes = self.download_url(&info.download.url)?;

        let actual_checksum = hex::encode(Sha256::digest(&archive_bytes));
        if actual_checksum != info.checksum {
            return Err(RegistryError::ChecksumMismatch {
                package: name.to_string(),
                version: version.to_string(),
                expected: info.checksum,
                actual: actual_checksum,
            });
        }

        // Extract into a sibling temp directory, then swap into place so a
        // half-written tree is never visible at `dest`.
        let parent = dest.parent().ok_or_else(|| {
            RegistryError::ExtractionError(format!("no parent directory for {}", dest.display()))
        })?;
        fs::create_dir_all(parent)?;

        let slot_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string());
        let tmp_dir = parent.join(format!(".{}.tmp-{}", slot_name, std::process::id()));
        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir)?;
        }
        fs::create_dir_all(&tmp_dir)?;

        self.extract_archive(&archive_bytes, &tmp_dir)?;

        if dest.exists() {
            fs::remove_dir_all(dest)?;
        }
        fs::rename(&tmp_dir, dest)?;

        Ok(())
    }
}

impl TemplateSource for HttpRegistry {
    fn project_templates(&self) -> Result<Vec<TemplateInfo>, RegistryError> {
        let url = format!("{}/templates", self.base_url);

        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "Registry returned status {}",
                response.status()
            )));
        }

        let templates: Vec<TemplateInfo> = response.json()?;
        Ok(templates)
    }
}

/// Highest published version, by semver ordering
///
/// Versions that fail to parse are skipped.
fn highest_version(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter_map(|v| semver::Version::parse(v).ok())
        .max()
        .map(|v| v.to_string())
}

/// Encode a package name for a URL path
///
/// Handles scoped packages (@org/name) by encoding the separating slash.
fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/name -> @org%2Fname
        name.replacen('/', "%2F", 1)
    } else {
        name.to_string()
    }
}
