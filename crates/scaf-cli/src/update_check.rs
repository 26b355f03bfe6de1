//! Startup version check
//!
//! Warns when the registry has published a newer scaf than the one running.
//! Advisory only: registry failures are swallowed so the nag can never break
//! a command.

use crate::output::StyledOutput;
use scaf_pm::Registry;
use semver::Version;

/// Package name this binary is published under.
const SELF_PACKAGE: &str = "scaf";

/// Compare the running version against the registry and warn when behind.
pub fn check_for_update(registry: &dyn Registry, out: &mut StyledOutput) {
    let current = env!("CARGO_PKG_VERSION");

    if let Some(latest) = newer_version(registry, current) {
        out.warning(&format!(
            "A newer scaf is available: {} (current {}). Upgrade with: cargo install scaf-cli",
            latest, current
        ));
    }
}

/// Latest registry version strictly newer than `current`, if any
fn newer_version(registry: &dyn Registry, current: &str) -> Option<String> {
    let latest = registry.latest_version(SELF_PACKAGE).ok()?;

    let current = Version::parse(current).ok()?;
    let published = Version::parse(&latest).ok()?;

    (published > current).then_some(latest)
}
