//! Run command implementation.
//!
//! This module implements the `run` command, which brings every selected
//! project into compliance and prints a report of what happened.

use crate::error::CliError;
use crate::utils::{connect, format_timestamp, load_configuration, resolve_projects, GlobalOptions};
use chrono::Utc;
use clap::{Args, ValueEnum};
use ipenforcer::gcp::RestCompute;
use ipenforcer::operations::RecordState;
use ipenforcer::{CancelToken, Enforcer, ProjectResult, RunReport};
use std::io::Write;

/// Release every external address in the selected projects.
#[derive(Args)]
pub struct RunCommand {
    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enforce this project instead of the host project's selection (repeatable)
    #[arg(long = "project", value_name = "PROJECT_ID")]
    pub projects: Vec<String>,

    /// Number of projects processed at once
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Report format
    #[arg(
        long,
        value_enum,
        default_value = "text",
        env = "IPENFORCER_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: ReportFormat,
}

/// Output format for the run report.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable summary
    Text,
    /// The full report as JSON
    Json,
}

impl RunCommand {
    /// Execute the run command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.max_parallel == Some(0) {
            return Err(CliError::InvalidArguments(
                "--max-parallel must be at least 1".to_string(),
            ));
        }

        // 1. Load configuration, flags on top
        let config = load_configuration(global)?;
        let mut options = config.reconcile_options();
        if self.dry_run {
            options = options.with_dry_run(true);
        }
        let parallel = self
            .max_parallel
            .unwrap_or_else(|| config.max_parallel_projects());

        // 2. Select projects
        let http = connect()?;
        let projects = resolve_projects(global, &config, &http, self.projects)?;

        // 3. Enforce
        let cancel = config
            .run_deadline()
            .map_or_else(CancelToken::new, CancelToken::with_deadline);
        let started = Utc::now();
        let compute = RestCompute::new(&http);
        let report = Enforcer::new(&compute, options)
            .with_max_parallel(parallel)
            .run(&projects, &cancel);

        // 4. Report
        match self.format {
            ReportFormat::Text => {
                if !global.quiet {
                    print_text(&report, &format_timestamp(started), global.verbose)?;
                }
            }
            ReportFormat::Json => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                serde_json::to_writer_pretty(&mut handle, &report)?;
                writeln!(handle)?;
            }
        }

        if report.has_failures() {
            return Err(CliError::SemanticFailure(format!(
                "{} address(es) failed, {} project(s) could not be listed, {} project(s) not started",
                report.failed(),
                report.fetch_failures(),
                report.cancelled()
            )));
        }
        Ok(())
    }
}

fn print_text(report: &RunReport, started: &str, verbose: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let mode = if report.dry_run { " [DRY RUN]" } else { "" };
    writeln!(handle, "Enforcement run started {started}{mode}")?;

    for result in &report.projects {
        match result {
            ProjectResult::Completed(project) => {
                writeln!(
                    handle,
                    "{}: deleted {}, planned {}, failed {}, skipped {}",
                    project.project, project.deleted, project.planned, project.failed, project.skipped
                )?;
                for outcome in &project.outcomes {
                    match &outcome.state {
                        RecordState::Failed(failure) => writeln!(
                            handle,
                            "  FAILED {} ({}) at {}: {}",
                            outcome.name, outcome.scope, failure.stage, failure.message
                        )?,
                        RecordState::Planned => {
                            for action in &outcome.actions_taken {
                                writeln!(handle, "  would {action}")?;
                            }
                        }
                        RecordState::Done if verbose => {
                            for action in &outcome.actions_taken {
                                writeln!(handle, "  {action}")?;
                            }
                        }
                        RecordState::Skipped { reason } if verbose => writeln!(
                            handle,
                            "  skipped {} ({}): {reason}",
                            outcome.name, outcome.scope
                        )?,
                        _ => {}
                    }
                }
            }
            ProjectResult::FetchFailed { project, error } => {
                writeln!(handle, "{project}: inventory unavailable: {error}")?;
            }
            ProjectResult::Cancelled { project, reason } => {
                writeln!(handle, "{project}: not started ({reason})")?;
            }
        }
    }

    writeln!(
        handle,
        "Total: {} deleted, {} planned, {} failed, {} skipped across {} project(s)",
        report.deleted(),
        report.planned(),
        report.failed(),
        report.skipped(),
        report.projects.len()
    )?;
    Ok(())
}
