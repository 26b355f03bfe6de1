//! Test doubles shared by the command and dispatch tests.

use scaf_pm::{Registry, RegistryError, TemplateInfo, TemplateSource, MANIFEST_FILE};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory registry that materializes minimal package trees
pub struct FakeRegistry {
    latest: String,
    main_field: Option<String>,
    latest_calls: RefCell<usize>,
    pub installs: RefCell<Vec<(String, String, PathBuf)>>,
}

impl FakeRegistry {
    /// Registry whose packages declare `lib/index.js` as their entry.
    pub fn latest(version: &str) -> Self {
        Self {
            latest: version.to_string(),
            main_field: Some("lib/index.js".to_string()),
            latest_calls: RefCell::new(0),
            installs: RefCell::new(Vec::new()),
        }
    }

    /// Registry whose packages declare no entry point.
    pub fn without_main(version: &str) -> Self {
        Self {
            main_field: None,
            ..Self::latest(version)
        }
    }

    pub fn install_count(&self) -> usize {
        self.installs.borrow().len()
    }

    pub fn latest_calls(&self) -> usize {
        *self.latest_calls.borrow()
    }
}

impl Registry for FakeRegistry {
    fn latest_version(&self, _name: &str) -> Result<String, RegistryError> {
        *self.latest_calls.borrow_mut() += 1;
        Ok(self.latest.clone())
    }

    fn install_into(&self, name: &str, version: &str, dest: &Path) -> Result<(), RegistryError> {
        fs::create_dir_all(dest)?;

        let main_line = self
            .main_field
            .as_ref()
            .map(|main| format!("main = \"{}\"\n", main))
            .unwrap_or_default();
        fs::write(
            dest.join(MANIFEST_FILE),
            format!(
                "[package]\nname = \"{}\"\nversion = \"{}\"\n{}",
                name, version, main_line
            ),
        )?;

        self.installs
            .borrow_mut()
            .push((name.to_string(), version.to_string(), dest.to_path_buf()));
        Ok(())
    }
}

/// Canned template listing
pub struct FakeTemplates {
    pub templates: Vec<TemplateInfo>,
}

impl FakeTemplates {
    pub fn with(entries: &[(&str, &str, &str)]) -> Self {
        Self {
            templates: entries
                .iter()
                .map(|(name, package, version)| TemplateInfo {
                    name: name.to_string(),
                    package: package.to_string(),
                    version: version.to_string(),
                })
                .collect(),
        }
    }
}

impl TemplateSource for FakeTemplates {
    fn project_templates(&self) -> Result<Vec<TemplateInfo>, RegistryError> {
        Ok(self.templates.clone())
    }
}
