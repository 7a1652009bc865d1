//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{PlanCommand, ProjectsCommand, RunCommand, ValidateCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Enforce the managed external IP policy on Google Cloud projects.
#[derive(Parser)]
#[command(name = "ipenforcer")]
#[command(version, about = "Enforce the managed external IP policy", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./ipenforcer.yaml when present)
    #[arg(long, value_name = "PATH", global = true, env = "IPENFORCER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host project the job runs on behalf of (defaults to the metadata server's project)
    #[arg(
        long,
        value_name = "PROJECT_ID",
        global = true,
        env = "IPENFORCER_HOST_PROJECT"
    )]
    pub host_project: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Release every external address in the selected projects
    Run(RunCommand),

    /// Show what a run would delete in a project
    Plan(PlanCommand),

    /// List the projects a run would enforce
    Projects(ProjectsCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),
}
