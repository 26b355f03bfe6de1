//! Helper-package model and cache operations
//!
//! A [`Package`] identifies one installable unit for one CLI invocation and
//! resolves it either from a direct filesystem path or from a deterministic,
//! versioned slot inside a shared store directory. Slots are only ever
//! created or replaced here, never deleted; eviction is someone else's
//! problem.

use crate::entry;
use crate::manifest::ManifestError;
use crate::registry::{Registry, RegistryError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version sentinel resolved against the registry on first use.
pub const LATEST: &str = "latest";

/// Errors in how a package was specified
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Package name is empty
    #[error("Package name cannot be empty")]
    EmptyName,

    /// Cache slot requested for a package resolved from a direct path
    #[error("Package {0} resolves from a target path; it has no cache slot")]
    NoStoreDir(String),
}

/// Errors that can occur while materializing a package
#[derive(Debug, Error)]
pub enum InstallError {
    /// Config error
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Registry error
    #[error("Registry error: {0}")]
    RegistryError(#[from] RegistryError),

    /// Store directory could not be created
    #[error("Failed to create store directory {}: {source}", .path.display())]
    StoreDirCreate { path: PathBuf, source: io::Error },
}

/// Errors that can occur while resolving a package's entry point
#[derive(Debug, Error)]
pub enum RootFileError {
    /// Config error
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Manifest error
    #[error("Manifest error: {0}")]
    ManifestError(#[from] ManifestError),
}

/// Where a package is resolved from
///
/// Exactly one mode is active for the lifetime of a `Package`; the choice is
/// made at construction and carried by the type.
#[derive(Debug, Clone)]
enum Location {
    /// Direct filesystem path; no cache, no install/update
    Target(PathBuf),

    /// Shared store directory holding versioned cache slots
    Store(PathBuf),
}

/// One installable helper package, scoped to a single CLI invocation
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name; may contain a scope segment (`@org/name`)
    name: String,

    /// Concrete semver string, or [`LATEST`] until resolved
    version: String,

    /// Active resolution mode
    location: Location,
}

impl Package {
    /// Package resolved directly from a filesystem location
    pub fn at_target(
        name: impl Into<String>,
        version: impl Into<String>,
        target_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self::new(name.into(), version.into(), Location::Target(target_path.into()))
    }

    /// Package resolved from a versioned slot inside `store_dir`
    pub fn in_store(
        name: impl Into<String>,
        version: impl Into<String>,
        store_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self::new(name.into(), version.into(), Location::Store(store_dir.into()))
    }

    fn new(name: String, version: String, location: Location) -> Result<Self, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }

        Ok(Self {
            name,
            version,
            location,
        })
    }

    /// Package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current version; concrete once [`resolve_version`](Self::resolve_version) has run
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether this package resolves through the store
    pub fn uses_store(&self) -> bool {
        matches!(self.location, Location::Store(_))
    }

    /// Slot directory prefix: every `/` in the name becomes `_`
    fn sanitized_name(&self) -> String {
        self.name.replace('/', "_")
    }

    /// Replace the [`LATEST`] sentinel with the registry's answer
    ///
    /// Memoized on the instance: once the version is concrete this is a
    /// no-op, so repeated calls resolve at most once.
    pub fn resolve_version(&mut self, registry: &dyn Registry) -> Result<(), RegistryError> {
        if self.version == LATEST {
            self.version = registry.latest_version(&self.name)?;
        }

        Ok(())
    }

    /// Deterministic cache slot for the current version
    ///
    /// Pure function of `(store_dir, name, version)`. Fails in target mode.
    pub fn cache_slot_path(&self) -> Result<PathBuf, ConfigError> {
        self.slot_path_for(&self.version)
    }

    /// Deterministic cache slot for an explicit version
    pub fn slot_path_for(&self, version: &str) -> Result<PathBuf, ConfigError> {
        match &self.location {
            Location::Store(store) => Ok(store.join(format!(
                "_{}@{}@{}",
                self.sanitized_name(),
                version,
                self.name
            ))),
            Location::Target(_) => Err(ConfigError::NoStoreDir(self.name.clone())),
        }
    }

    fn ensure_store_dir(&self) -> Result<(), InstallError> {
        if let Location::Store(store) = &self.location {
            fs::create_dir_all(store).map_err(|source| InstallError::StoreDirCreate {
                path: store.clone(),
                source,
            })?;
        }

        Ok(())
    }

    /// Whether the package is materialized at the expected version
    ///
    /// In store mode this creates the store directory if missing (its only
    /// side effect), resolves the version, and tests slot presence. In
    /// target mode it tests the target path. Never installs.
    pub fn exists(&mut self, registry: &dyn Registry) -> Result<bool, InstallError> {
        if let Location::Target(target) = &self.location {
            return Ok(target.exists());
        }

        self.ensure_store_dir()?;
        self.resolve_version(registry)?;

        Ok(self.cache_slot_path()?.exists())
    }

    /// Fetch the package from the registry into its cache slot
    ///
    /// Safe to call when the slot already exists; the registry replaces the
    /// tree. One attempt, no retry.
    pub fn install(&mut self, registry: &dyn Registry) -> Result<(), InstallError> {
        self.resolve_version(registry)?;
        self.ensure_store_dir()?;

        let slot = self.cache_slot_path()?;
        registry.install_into(&self.name, &self.version, &slot)?;

        Ok(())
    }

    /// Bring the cache up to the registry's latest version
    ///
    /// Installs into a new slot only when the latest version has no slot
    /// yet; older slots are left intact. The package's version is pinned to
    /// the resolved latest either way, so repeated calls converge.
    pub fn update(&mut self, registry: &dyn Registry) -> Result<(), InstallError> {
        self.ensure_store_dir()?;

        let latest = registry.latest_version(&self.name)?;
        let slot = self.slot_path_for(&latest)?;

        if !slot.exists() {
            registry.install_into(&self.name, &latest, &slot)?;
        }
        self.version = latest;

        Ok(())
    }

    /// Entry point declared by the package's manifest, if any
    ///
    /// Chooses the base directory per the active resolution mode and
    /// delegates to [`entry::entry_file`]. In store mode the version must
    /// already be concrete.
    pub fn root_file(&self) -> Result<Option<PathBuf>, RootFileError> {
        let base = match &self.location {
            Location::Target(target) => target.clone(),
            Location::Store(_) => self.cache_slot_path()?,
        };

        Ok(entry::entry_file(&base)?)
    }

    /// Target path, when resolving in target mode
    pub fn target_path(&self) -> Option<&Path> {
        match &self.location {
            Location::Target(target) => Some(target),
            Location::Store(_) => None,
        }
    }
}
