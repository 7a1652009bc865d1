//! Plan command implementation.
//!
//! This module implements the `plan` command, which lists each external
//! address of a project with the deletes a run would issue for it.

use crate::error::CliError;
use crate::utils::{connect, load_configuration, GlobalOptions};
use clap::{Args, ValueEnum};
use ipenforcer::gcp::RestCompute;
use ipenforcer::{AddressRecord, DeletionPlan, Disposition, Reconciler};
use std::io::Write;

/// Column headers for table output.
const COLUMN_HEADERS: [&str; 6] = ["project", "name", "address", "scope", "status", "actions"];

/// Show what a run would delete in a project.
#[derive(Args)]
pub struct PlanCommand {
    /// Project to plan (repeatable)
    #[arg(long = "project", value_name = "PROJECT_ID", required = true)]
    pub projects: Vec<String>,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "table",
        env = "IPENFORCER_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: PlanFormat,
}

/// Output format for the plan command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum PlanFormat {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
}

impl PlanCommand {
    /// Execute the plan command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let http = connect()?;
        let compute = RestCompute::new(&http);
        let reconciler = Reconciler::new(&compute, config.reconcile_options().with_dry_run(true));

        let mut plans = Vec::new();
        for project in &self.projects {
            for (record, plan) in reconciler.plan_project(project)? {
                plans.push((project.as_str(), record, plan));
            }
        }

        match self.format {
            PlanFormat::Table => format_as_table(&plans),
            PlanFormat::Json => format_as_json(&plans),
        }
    }
}

fn actions(plan: &DeletionPlan) -> String {
    match &plan.disposition {
        Disposition::Unsupported { reason } => format!("none (unsupported: {reason})"),
        _ => plan
            .actions
            .iter()
            .map(|action| action.description())
            .collect::<Vec<_>>()
            .join(", then "),
    }
}

fn format_as_table(plans: &[(&str, AddressRecord, DeletionPlan)]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let header_line = COLUMN_HEADERS
        .iter()
        .map(|s| s.to_uppercase())
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(handle, "{header_line}")?;

    for (project, record, plan) in plans {
        writeln!(
            handle,
            "{}\t{}\t{}\t{}\t{}\t{}",
            project,
            record.name,
            if record.address.is_empty() { "-" } else { record.address.as_str() },
            record.scope,
            record.status,
            actions(plan),
        )?;
    }

    Ok(())
}

fn format_as_json(plans: &[(&str, AddressRecord, DeletionPlan)]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let json_data: Vec<serde_json::Value> = plans
        .iter()
        .map(|(project, record, plan)| {
            serde_json::json!({
                "project": project,
                "address": record,
                "plan": plan,
            })
        })
        .collect();

    serde_json::to_writer_pretty(&mut handle, &json_data)?;
    writeln!(handle)?;
    Ok(())
}
