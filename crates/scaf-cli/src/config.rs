//! CLI configuration
//!
//! The dispatcher receives an explicit [`Config`] rather than reading
//! process state; environment variables are consulted once, here, and flags
//! win over environment over defaults.

use anyhow::anyhow;
use scaf_pm::DEFAULT_REGISTRY;
use std::env;
use std::path::PathBuf;

/// Environment variable overriding the registry base URL.
pub const ENV_REGISTRY: &str = "SCAF_REGISTRY";

/// Environment variable overriding the cache home.
pub const ENV_HOME: &str = "SCAF_HOME";

/// Environment variable enabling debug output.
pub const ENV_DEBUG: &str = "SCAF_DEBUG";

/// Cache home directory name under the user's home.
const DEFAULT_HOME_DIR: &str = ".scaf";

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry base URL
    pub registry_url: String,

    /// Root of all on-disk state
    pub cache_home: PathBuf,

    /// Local helper override; target mode when set
    pub target_path: Option<PathBuf>,

    /// Verbose diagnostics
    pub debug: bool,

    /// Run helpers in an isolated child process
    pub isolate: bool,
}

/// Flag-level overrides collected by the CLI layer
#[derive(Debug, Default)]
pub struct Overrides {
    /// `--target-path`
    pub target_path: Option<PathBuf>,

    /// `--debug`
    pub debug: bool,

    /// `--no-isolate`
    pub no_isolate: bool,
}

impl Config {
    /// Build the configuration from flags, environment, and defaults
    pub fn from_env(overrides: Overrides) -> anyhow::Result<Self> {
        Self::resolve(
            env::var(ENV_REGISTRY).ok(),
            env::var_os(ENV_HOME).map(PathBuf::from),
            env_flag(ENV_DEBUG),
            dirs::home_dir(),
            overrides,
        )
    }

    fn resolve(
        env_registry: Option<String>,
        env_home: Option<PathBuf>,
        env_debug: bool,
        home_dir: Option<PathBuf>,
        overrides: Overrides,
    ) -> anyhow::Result<Self> {
        let registry_url = env_registry
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());

        let cache_home = match env_home.filter(|p| !p.as_os_str().is_empty()) {
            Some(home) => home,
            None => home_dir
                .ok_or_else(|| anyhow!("Could not determine home directory"))?
                .join(DEFAULT_HOME_DIR),
        };

        let target_path = overrides
            .target_path
            .filter(|p| !p.as_os_str().is_empty());

        Ok(Self {
            registry_url,
            cache_home,
            target_path,
            debug: overrides.debug || env_debug,
            isolate: !overrides.no_isolate,
        })
    }

    /// Store directory holding helper-package cache slots
    pub fn store_dir(&self) -> PathBuf {
        self.cache_home.join("store")
    }

    /// Store directory holding project-template cache slots
    pub fn templates_dir(&self) -> PathBuf {
        self.cache_home.join("templates")
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
