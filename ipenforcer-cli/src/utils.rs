//! Utility functions for CLI operations.
//!
//! This module provides the helpers shared by CLI commands: configuration
//! loading, host project resolution, client construction and output
//! formatting.

use crate::error::CliError;
use chrono::{DateTime, Utc};
use ipenforcer::gcp::{metadata_project_id, GcpHttp, RestProjects, RestStorage};
use ipenforcer::{Config, ConfigLoader, Error, ProjectSelector};
use std::env;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Explicit configuration file.
    pub config: Option<PathBuf>,

    /// The host project the job runs on behalf of.
    pub host_project: Option<String>,
}

/// Load the effective configuration.
///
/// Sources, highest priority first:
/// 1. Command-line flags (applied by each command)
/// 2. Environment variables
/// 3. The configuration file (`--config` or `./ipenforcer.yaml`)
/// 4. Built-in defaults
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let working_dir = env::current_dir()?;
    let source = ConfigLoader::load_effective(global.config.as_deref(), &working_dir)?;
    match source.path {
        Some(ref path) => log::debug!("loaded configuration path={}", path.display()),
        None => log::debug!("no configuration file found, using defaults"),
    }
    Ok(source.config)
}

/// Resolve the host project, asking the metadata server when no flag or
/// environment variable names one.
pub fn resolve_host_project(global: &GlobalOptions) -> Result<String, CliError> {
    if let Some(ref host) = global.host_project {
        return Ok(host.clone());
    }

    metadata_project_id().map_err(|e| {
        CliError::Library(Error::ProjectResolution {
            project: "<unknown>".into(),
            reason: format!("no --host-project given and the metadata server is unavailable: {e}"),
        })
    })
}

/// Resolve the projects to enforce.
///
/// Explicit project ids win; otherwise the host project's profile decides.
pub fn resolve_projects(
    global: &GlobalOptions,
    config: &Config,
    http: &GcpHttp,
    explicit: Vec<String>,
) -> Result<Vec<String>, CliError> {
    if !explicit.is_empty() {
        return Ok(explicit);
    }

    let host = resolve_host_project(global)?;
    let projects = RestProjects::new(http);
    let storage = RestStorage::new(http);
    let selected = ProjectSelector::new(config, &projects, &storage).select(&host)?;
    log::info!("resolved projects host={host} projects={}", selected.len());
    Ok(selected)
}

/// Build the shared API client.
pub fn connect() -> Result<GcpHttp, CliError> {
    GcpHttp::from_env().map_err(CliError::from)
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
