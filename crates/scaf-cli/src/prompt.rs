//! Input validation for init prompts
//!
//! Each rule is a pure predicate over the candidate string paired with an
//! explicit message; nothing here defers or calls back.

use regex::Regex;

/// Message shown when a project name is rejected.
pub const PROJECT_NAME_MESSAGE: &str =
    "project names start with a letter, may use '-' or '_' followed by a letter, \
     and end with a letter or digit";

/// Message shown when a project version is rejected.
pub const PROJECT_VERSION_MESSAGE: &str = "project versions must be valid semver (e.g. 1.0.0)";

/// Whether `name` is an acceptable project name.
///
/// Legal: `a`, `a-b`, `a_b`, `a-b1-c1`. Illegal: `1`, `a-`, `a-1`, `_a`.
pub fn valid_project_name(name: &str) -> bool {
    let rule =
        Regex::new(r"^[a-zA-Z]+([-][a-zA-Z][a-zA-Z0-9]*|[_][a-zA-Z][a-zA-Z0-9]*|[a-zA-Z0-9])*$")
            .unwrap();
    rule.is_match(name)
}

/// Whether `version` is an acceptable project version.
pub fn valid_project_version(version: &str) -> bool {
    semver::Version::parse(version).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_project_names() {
        for name in ["a", "abc", "a-b", "a_b", "a_b-c", "a-b1-c1", "a_b1-c1", "abc123"] {
            assert!(valid_project_name(name), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_invalid_project_names() {
        for name in ["", "1", "1abc", "a_", "a-", "a_1", "a-1", "_a", "-a", "my app", "my.app"] {
            assert!(!valid_project_name(name), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_valid_project_versions() {
        for version in ["1.0.0", "0.1.2", "10.20.30", "1.0.0-alpha.1"] {
            assert!(valid_project_version(version), "{} should be accepted", version);
        }
    }

    #[test]
    fn test_invalid_project_versions() {
        for version in ["", "1", "1.0", "v1.0.0", "latest"] {
            assert!(!valid_project_version(version), "{} should be rejected", version);
        }
    }
}
