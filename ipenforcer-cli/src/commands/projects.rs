//! Projects command implementation.
//!
//! This module implements the `projects` command, which prints the projects
//! a run on behalf of the host project would cover.

use crate::error::CliError;
use crate::utils::{connect, load_configuration, resolve_projects, GlobalOptions};
use clap::Parser;
use std::io::Write;

/// List the projects a run would enforce.
#[derive(Parser)]
#[command(about = "List the projects a run would enforce")]
pub struct ProjectsCommand {
    /// Print the list as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl ProjectsCommand {
    /// Execute the projects command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let http = connect()?;
        let projects = resolve_projects(global, &config, &http, Vec::new())?;

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();

        if self.json {
            serde_json::to_writer(&mut handle, &projects)?;
            writeln!(handle)?;
        } else {
            for project in projects {
                writeln!(handle, "{project}")?;
            }
        }

        Ok(())
    }
}
