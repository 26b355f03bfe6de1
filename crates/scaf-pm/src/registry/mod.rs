//! Registry client for the scaf helper-package registry
//!
//! Provides the abstract registry operations the package cache depends on
//! and a blocking HTTP implementation.

mod api;
mod client;

pub use api::{PackageMetadata, TemplateInfo, VersionDownload, VersionInfo};
pub use client::{HttpRegistry, Registry, RegistryError, TemplateSource, DEFAULT_REGISTRY};
