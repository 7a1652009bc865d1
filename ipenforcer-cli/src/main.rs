//! Main entry point for the ipenforcer CLI.
//!
//! The scheduled compliance job runs `ipenforcer run`. The other commands
//! support operators:
//! - `plan`: show what a run would delete
//! - `projects`: show which projects a run covers
//! - `validate`: check a configuration file

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let level = ipenforcer::init_logger(cli.verbose, cli.quiet);
    log::debug!("logging initialised level={level}");

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        host_project: cli.host_project,
    };

    let result = match cli.command {
        cli::Command::Run(cmd) => cmd.execute(&global),
        cli::Command::Plan(cmd) => cmd.execute(&global),
        cli::Command::Projects(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
