//! Command dispatch
//!
//! Resolves a sub-command to its backing helper package, materializes that
//! package through the cache, locates its entry point, and invokes it. One
//! invocation walks START → RESOLVING → (INSTALLING | UPDATING)? →
//! LOCATING_ENTRY → INVOKING; any failure before INVOKING aborts the
//! dispatch with nothing run.

use crate::config::Config;
use crate::output::StyledOutput;
use scaf_pm::{InstallError, Package, Registry, RootFileError, LATEST};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// One sub-command: its backing helper package and in-process binding
pub struct CommandSpec {
    /// Sub-command name
    pub name: &'static str,

    /// Helper package that implements the command
    pub package: &'static str,

    /// In-process implementation, bound when isolation is off
    pub builtin: Builtin,
}

/// In-process binding for a sub-command.
pub type Builtin = fn(&CommandCall, &Config) -> anyhow::Result<i32>;

/// Registered sub-commands.
const COMMANDS: &[CommandSpec] = &[CommandSpec {
    name: "init",
    package: "@scaf/init",
    builtin: crate::commands::init::run,
}];

/// Spec for a registered sub-command, if any.
pub fn command_spec(command: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == command)
}

/// Options forwarded to a helper entry point
///
/// Fields marked `skip` are internal to the dispatcher and are stripped
/// from the serialized bag a child process receives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallOptions {
    /// Proceed in a non-empty directory
    pub force: bool,

    /// Template name chosen on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Initial project version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_version: Option<String>,

    /// Parent-side diagnostics toggle; not forwarded
    #[serde(skip)]
    pub debug: bool,
}

/// One command invocation: positional arguments plus the options bag
#[derive(Debug, Clone, Default)]
pub struct CommandCall {
    /// Positional arguments after the command name
    pub args: Vec<String>,

    /// Parsed flags
    pub options: CallOptions,
}

/// Errors that can occur while invoking an entry point
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Child process could not be started
    #[error("Failed to spawn {}: {source}", .entry.display())]
    Spawn {
        entry: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Options bag could not be serialized
    #[error("Failed to encode options: {0}")]
    Marshal(#[from] serde_json::Error),

    /// In-process command failed
    #[error("{0}")]
    Command(String),
}

/// A resolved unit of invokable code
///
/// Both strategies present the same surface, so the dispatcher never knows
/// which one it is running.
pub trait Invokable {
    /// Run with the forwarded call; returns the exit code.
    fn run(&self, call: &CommandCall) -> Result<i32, InvokeError>;
}

/// Runs the command's builtin binding in the parent's address space
pub struct InProcess<'a> {
    builtin: Builtin,
    config: &'a Config,
}

impl<'a> InProcess<'a> {
    pub fn new(builtin: Builtin, config: &'a Config) -> Self {
        Self { builtin, config }
    }
}

impl Invokable for InProcess<'_> {
    fn run(&self, call: &CommandCall) -> Result<i32, InvokeError> {
        (self.builtin)(call, self.config).map_err(|e| InvokeError::Command(format!("{:#}", e)))
    }
}

/// Spawns the resolved entry file as a child process
///
/// The child inherits the working directory and terminal streams; the
/// returned code is the child's own exit code.
pub struct Subprocess {
    entry: PathBuf,
}

impl Subprocess {
    pub fn new(entry: PathBuf) -> Self {
        Self { entry }
    }
}

impl Invokable for Subprocess {
    fn run(&self, call: &CommandCall) -> Result<i32, InvokeError> {
        let argv = marshal_args(call)?;

        let mut command = base_command(&self.entry);
        command.args(&argv);

        let status = command.status().map_err(|source| InvokeError::Spawn {
            entry: self.entry.clone(),
            source,
        })?;

        Ok(status.code().unwrap_or(127))
    }
}

/// Child argv: positionals, then one JSON argument carrying the sanitized
/// options bag.
fn marshal_args(call: &CommandCall) -> Result<Vec<String>, InvokeError> {
    let mut argv = call.args.clone();
    argv.push(serde_json::to_string(&call.options)?);
    Ok(argv)
}

// Windows cannot execute an entry file without a shell wrapper.
#[cfg(windows)]
fn base_command(entry: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(entry);
    command
}

#[cfg(not(windows))]
fn base_command(entry: &Path) -> Command {
    Command::new(entry)
}

/// Errors that can occur during dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No helper package registered for the command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Package misconfiguration
    #[error("Config error: {0}")]
    Config(#[from] scaf_pm::ConfigError),

    /// Package could not be materialized
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// Package has no resolvable entry point
    #[error("No entry point found for {name}@{version}")]
    EntryNotFound { name: String, version: String },

    /// Entry resolution failed
    #[error("Entry resolution failed: {0}")]
    RootFile(#[from] RootFileError),

    /// Invocation failed to start
    #[error("Invoke error: {0}")]
    Invoke(#[from] InvokeError),
}

/// Per-invocation dispatcher
pub struct Dispatcher<'a> {
    config: &'a Config,
    registry: &'a dyn Registry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a Config, registry: &'a dyn Registry) -> Self {
        Self { config, registry }
    }

    /// Resolve `command` to its helper package and run it with `call`
    ///
    /// Returns the invocation's exit code.
    pub fn dispatch(
        &self,
        command: &str,
        call: &CommandCall,
        out: &mut StyledOutput,
    ) -> Result<i32, DispatchError> {
        let spec = command_spec(command)
            .ok_or_else(|| DispatchError::UnknownCommand(command.to_string()))?;

        self.dispatch_spec(spec, call, out)
    }

    /// Dispatch a resolved command spec
    pub fn dispatch_spec(
        &self,
        spec: &CommandSpec,
        call: &CommandCall,
        out: &mut StyledOutput,
    ) -> Result<i32, DispatchError> {
        let pkg = self.resolve_package(spec.package, out)?;

        let entry = pkg.root_file()?.ok_or_else(|| DispatchError::EntryNotFound {
            name: pkg.name().to_string(),
            version: pkg.version().to_string(),
        })?;
        out.verbose(&format!("entry {}", entry.display()));

        let code = if self.config.isolate {
            Subprocess::new(entry).run(call)?
        } else {
            InProcess::new(spec.builtin, self.config).run(call)?
        };

        Ok(code)
    }

    /// Materialize the backing package per the active resolution mode
    ///
    /// A target path bypasses the cache entirely; otherwise the store is
    /// brought up to date with exactly one of install or update.
    fn resolve_package(
        &self,
        package_name: &str,
        out: &mut StyledOutput,
    ) -> Result<Package, DispatchError> {
        if let Some(target) = &self.config.target_path {
            out.verbose(&format!("target path {}", target.display()));
            return Ok(Package::at_target(package_name, LATEST, target)?);
        }

        let store_dir = self.config.store_dir();
        out.verbose(&format!("store dir {}", store_dir.display()));

        let mut pkg = Package::in_store(package_name, LATEST, store_dir)?;
        if pkg.exists(self.registry)? {
            pkg.update(self.registry)?;
        } else {
            pkg.install(self.registry)?;
        }

        Ok(pkg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeRegistry;
    use scaf_pm::MANIFEST_FILE;
    use std::fs;
    use termcolor::ColorChoice;

    fn builtin_exit_42(_call: &CommandCall, _config: &Config) -> anyhow::Result<i32> {
        Ok(42)
    }

    fn builtin_check_forwarding(call: &CommandCall, _config: &Config) -> anyhow::Result<i32> {
        let forwarded = call.args == vec!["myapp".to_string()] && call.options.force;
        Ok(if forwarded { 0 } else { 1 })
    }

    fn spec_with(builtin: Builtin) -> CommandSpec {
        CommandSpec {
            name: "init",
            package: "@scaf/init",
            builtin,
        }
    }

    fn test_config(cache_home: PathBuf, isolate: bool) -> Config {
        Config {
            registry_url: "https://registry.invalid".to_string(),
            cache_home,
            target_path: None,
            debug: false,
            isolate,
        }
    }

    fn quiet() -> StyledOutput {
        StyledOutput::new(ColorChoice::Never, false)
    }

    #[test]
    fn test_unknown_command() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path().to_path_buf(), false);
        let registry = FakeRegistry::latest("1.0.0");
        let dispatcher = Dispatcher::new(&config, &registry);

        let result = dispatcher.dispatch("frobnicate", &CommandCall::default(), &mut quiet());
        assert!(matches!(result, Err(DispatchError::UnknownCommand(_))));
    }

    #[test]
    fn test_fresh_dispatch_installs_once_and_forwards_call() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path().to_path_buf(), false);
        let registry = FakeRegistry::latest("1.2.3");
        let dispatcher = Dispatcher::new(&config, &registry);

        let call = CommandCall {
            args: vec!["myapp".to_string()],
            options: CallOptions {
                force: true,
                ..CallOptions::default()
            },
        };

        let code = dispatcher
            .dispatch_spec(&spec_with(builtin_check_forwarding), &call, &mut quiet())
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(registry.install_count(), 1);
        let installs = registry.installs.borrow();
        assert_eq!(installs[0].0, "@scaf/init");
        assert_eq!(installs[0].1, "1.2.3");
    }

    #[test]
    fn test_second_dispatch_updates_without_reinstall() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path().to_path_buf(), false);
        let registry = FakeRegistry::latest("1.2.3");
        let dispatcher = Dispatcher::new(&config, &registry);
        let spec = spec_with(builtin_exit_42);

        dispatcher
            .dispatch_spec(&spec, &CommandCall::default(), &mut quiet())
            .unwrap();
        dispatcher
            .dispatch_spec(&spec, &CommandCall::default(), &mut quiet())
            .unwrap();

        // The latest version's slot already exists on the second pass.
        assert_eq!(registry.install_count(), 1);
    }

    #[test]
    fn test_target_path_bypasses_registry() {
        let temp = tempfile::tempdir().unwrap();
        let helper_dir = temp.path().join("helper");
        fs::create_dir_all(&helper_dir).unwrap();
        fs::write(
            helper_dir.join(MANIFEST_FILE),
            "[package]\nname = \"@scaf/init\"\nversion = \"0.0.0\"\nmain = \"lib/index.js\"\n",
        )
        .unwrap();

        let mut config = test_config(temp.path().to_path_buf(), false);
        config.target_path = Some(helper_dir);

        let registry = FakeRegistry::latest("1.2.3");
        let dispatcher = Dispatcher::new(&config, &registry);

        let code = dispatcher
            .dispatch_spec(&spec_with(builtin_exit_42), &CommandCall::default(), &mut quiet())
            .unwrap();

        assert_eq!(code, 42);
        assert_eq!(registry.install_count(), 0);
        assert_eq!(registry.latest_calls(), 0);
    }

    #[test]
    fn test_missing_main_is_entry_not_found() {
        let temp = tempfile::tempdir().unwrap();
        // Isolation on: were an entry found, a spawn would be attempted.
        let config = test_config(temp.path().to_path_buf(), true);
        let registry = FakeRegistry::without_main("1.2.3");
        let dispatcher = Dispatcher::new(&config, &registry);

        let result =
            dispatcher.dispatch_spec(&spec_with(builtin_exit_42), &CommandCall::default(), &mut quiet());

        assert!(matches!(result, Err(DispatchError::EntryNotFound { .. })));
        assert_eq!(registry.install_count(), 1);
    }

    #[test]
    fn test_marshal_args_appends_sanitized_options() {
        let call = CommandCall {
            args: vec!["myapp".to_string()],
            options: CallOptions {
                force: true,
                debug: true,
                ..CallOptions::default()
            },
        };

        let argv = marshal_args(&call).unwrap();
        // `debug` is internal and stripped from the bag.
        assert_eq!(argv, vec!["myapp".to_string(), r#"{"force":true}"#.to_string()]);
    }

    #[test]
    fn test_marshal_args_keeps_template_choice() {
        let call = CommandCall {
            args: Vec::new(),
            options: CallOptions {
                force: false,
                template: Some("webapp".to_string()),
                ..CallOptions::default()
            },
        };

        let argv = marshal_args(&call).unwrap();
        assert_eq!(argv, vec![r#"{"force":false,"template":"webapp"}"#.to_string()]);
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let invoker = Subprocess::new(PathBuf::from("/does/not/exist/entry"));
        let result = invoker.run(&CommandCall::default());

        assert!(matches!(result, Err(InvokeError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_mirrors_child_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let helper_dir = temp.path().join("helper");
        fs::create_dir_all(helper_dir.join("bin")).unwrap();
        fs::write(
            helper_dir.join(MANIFEST_FILE),
            "[package]\nname = \"@scaf/init\"\nversion = \"0.0.0\"\nmain = \"bin/run\"\n",
        )
        .unwrap();
        let script = helper_dir.join("bin").join("run");
        fs::write(&script, "#!/bin/sh\nexit 7\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = test_config(temp.path().to_path_buf(), true);
        config.target_path = Some(helper_dir);

        let registry = FakeRegistry::latest("1.0.0");
        let dispatcher = Dispatcher::new(&config, &registry);

        let code = dispatcher
            .dispatch_spec(&spec_with(builtin_exit_42), &CommandCall::default(), &mut quiet())
            .unwrap();

        assert_eq!(code, 7);
    }
}
