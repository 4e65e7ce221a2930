mod buf;
mod cli;
mod command;
mod command_handlers;
mod config;
mod dirs;
mod error;
mod files;
mod installer;
mod logging;
mod platform;
#[cfg(test)]
mod testing;
mod tools;
mod transport;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing::{debug, error};

use crate::cli::Cli;
use crate::command::SystemRunner;
use crate::command_handlers::Context;
use crate::config::DevConfig;
use crate::dirs::Dirs;
use crate::tools::Registry;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let project = config::project_root()?;
    let config = DevConfig::load(&project)?;
    let registry = Registry::builtin()?;
    let dirs = Dirs::new(&project, &config.system_prefix);
    // Tools installed into the local prefix must be visible to later steps of the same run.
    let local_bin = dirs.local_bin().ok();
    debug!(
        project = %project.display(),
        bin = %dirs.bin().display(),
        local_bin = ?local_bin,
        "resolved directories"
    );
    let runner = SystemRunner::new(&project, local_bin.as_deref());
    let ctx = Context {
        config,
        registry,
        dirs,
        runner,
    };
    command_handlers::dispatch::dispatch(command, &ctx)
}
