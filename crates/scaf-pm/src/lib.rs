//! Scaf package resolution library
//!
//! This crate provides the package layer of the scaf CLI, including:
//! - Registry client (latest-version lookup, package download)
//! - Versioned on-disk package cache with deterministic slot naming
//! - Package manifest parsing (scaf.toml)
//! - Entry-point resolution

pub mod entry;
pub mod manifest;
pub mod package;
pub mod registry;

pub use entry::{entry_file, find_package_dir, platform_neutral};
pub use manifest::{ManifestError, PackageInfo, PackageManifest, MANIFEST_FILE};
pub use package::{ConfigError, InstallError, Package, RootFileError, LATEST};
pub use registry::{
    HttpRegistry, PackageMetadata, Registry, RegistryError, TemplateInfo, TemplateSource,
    VersionDownload, VersionInfo, DEFAULT_REGISTRY,
};
