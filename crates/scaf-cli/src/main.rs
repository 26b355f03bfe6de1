//! Scaf command-line scaffolding tool
//!
//! Resolves sub-commands to versioned helper packages, keeps them cached
//! from the registry, and runs them with forwarded arguments — in-process
//! or in an isolated child whose exit code the parent mirrors.

mod commands;
mod config;
mod dispatch;
mod output;
mod prompt;
#[cfg(test)]
mod testutil;
mod update_check;

use clap::{Parser, Subcommand};
use config::{Config, Overrides};
use dispatch::{CallOptions, CommandCall, Dispatcher};
use output::{resolve_color_choice, StyledOutput};
use scaf_pm::HttpRegistry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scaf")]
#[command(about = "Command-line scaffolding tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug output
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Resolve the helper package from a local path instead of the cache
    #[arg(long, global = true, value_name = "PATH")]
    target_path: Option<PathBuf>,

    /// Run the helper in this process instead of a child process
    #[arg(long, global = true)]
    no_isolate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project from a template
    Init {
        /// Project name
        project_name: String,

        /// Clear a non-empty directory before initializing
        #[arg(short, long)]
        force: bool,

        /// Template to use (defaults to the first published template)
        #[arg(long)]
        template: Option<String>,

        /// Initial project version [default: 1.0.0]
        #[arg(long, value_name = "SEMVER")]
        project_version: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(Overrides {
        target_path: cli.target_path,
        debug: cli.debug,
        no_isolate: cli.no_isolate,
    })?;

    let mut out = StyledOutput::new(resolve_color_choice(), config.debug);
    out.verbose(&format!("scaf {}", env!("CARGO_PKG_VERSION")));
    out.verbose(&format!("registry {}", config.registry_url));
    out.verbose(&format!("cache home {}", config.cache_home.display()));

    let registry = HttpRegistry::with_url(&config.registry_url)?;
    update_check::check_for_update(&registry, &mut out);

    let (command, call) = match cli.command {
        Commands::Init {
            project_name,
            force,
            template,
            project_version,
        } => (
            "init",
            CommandCall {
                args: vec![project_name],
                options: CallOptions {
                    force,
                    template,
                    project_version,
                    debug: config.debug,
                },
            },
        ),
    };

    let dispatcher = Dispatcher::new(&config, &registry);
    match dispatcher.dispatch(command, &call, &mut out) {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            out.stderr_error(&format!("Error: {}", err));
            std::process::exit(1);
        }
    }
}
