//! Host project to enforced project list.

use crate::config::{Config, HostConfig};
use crate::error::{Error, Result};

use super::exclusions::ExclusionSet;

/// Lists the projects in a folder.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectSource: Send + Sync {
    /// Returns the ids of the active projects directly under `folder_id`,
    /// in listing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list_folder_projects(&self, folder_id: &str) -> Result<Vec<String>>;
}

/// Downloads the exclusion object.
#[cfg_attr(test, mockall::automock)]
pub trait ExclusionSource: Send + Sync {
    /// Returns the contents of `object` in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    fn fetch_object(&self, bucket: &str, object: &str) -> Result<String>;
}

/// Selects the projects to enforce for a host project.
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::config::Config;
/// use ipenforcer::selection::{ExclusionSource, ProjectSelector, ProjectSource};
///
/// fn projects(
///     config: &Config,
///     folders: &dyn ProjectSource,
///     storage: &dyn ExclusionSource,
/// ) -> ipenforcer::Result<Vec<String>> {
///     ProjectSelector::new(config, folders, storage).select("my-host-project")
/// }
/// ```
pub struct ProjectSelector<'a> {
    config: &'a Config,
    projects: &'a dyn ProjectSource,
    exclusions: &'a dyn ExclusionSource,
}

impl<'a> ProjectSelector<'a> {
    /// Creates a selector.
    #[must_use]
    pub fn new(
        config: &'a Config,
        projects: &'a dyn ProjectSource,
        exclusions: &'a dyn ExclusionSource,
    ) -> Self {
        Self {
            config,
            projects,
            exclusions,
        }
    }

    /// Returns the projects enforced on behalf of `host`.
    ///
    /// A fixed project list is returned as configured. A folder profile lists
    /// the folder and drops every project matching the exclusion list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectResolution`] if `host` has no profile, or if
    /// the folder or exclusion list cannot be read.
    pub fn select(&self, host: &str) -> Result<Vec<String>> {
        let profile = self.config.host(host).ok_or_else(|| Error::ProjectResolution {
            project: host.to_string(),
            reason: "host project has no configured profile".into(),
        })?;

        match profile {
            HostConfig {
                projects: Some(projects),
                ..
            } => {
                log::info!(
                    "selected fixed project list host={host} projects={}",
                    projects.len()
                );
                Ok(projects.clone())
            }
            HostConfig {
                folder_id: Some(folder),
                ..
            } => self.select_folder(host, folder),
            HostConfig { .. } => Err(Error::ProjectResolution {
                project: host.to_string(),
                reason: "profile names neither projects nor folder_id".into(),
            }),
        }
    }

    fn select_folder(&self, host: &str, folder: &str) -> Result<Vec<String>> {
        let resolution = |reason: String| Error::ProjectResolution {
            project: host.to_string(),
            reason,
        };

        let exclusions = self
            .load_exclusions(host)
            .map_err(|e| resolution(format!("cannot load exclusion list: {e}")))?;
        let listed = self
            .projects
            .list_folder_projects(folder)
            .map_err(|e| resolution(format!("cannot list folder {folder}: {e}")))?;

        let total = listed.len();
        let selected: Vec<String> = listed
            .into_iter()
            .filter(|project| {
                let excluded = exclusions.is_excluded(project);
                if excluded {
                    log::debug!("excluding project host={host} project={project}");
                }
                !excluded
            })
            .collect();

        log::info!(
            "selected folder projects host={host} folder={folder} listed={total} selected={} fragments={}",
            selected.len(),
            exclusions.len()
        );
        Ok(selected)
    }

    fn load_exclusions(&self, host: &str) -> Result<ExclusionSet> {
        let bucket = format!("{host}{}", self.config.bucket_suffix());
        let object = self.config.exclusion_object();
        let text = self.exclusions.fetch_object(&bucket, object)?;
        ExclusionSet::from_jsonl(&text, &self.config.builtin_exclusions())
    }
}
