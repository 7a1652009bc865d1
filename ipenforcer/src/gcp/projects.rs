//! Resource Manager v1 project listing.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::selection::ProjectSource;

use super::http::{join_url, GcpHttp};

/// Default Resource Manager v1 endpoint.
pub const RESOURCE_MANAGER_BASE: &str = "https://cloudresourcemanager.googleapis.com/v1";

const ACTIVE: &str = "ACTIVE";

/// One page of `projects.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsPage {
    /// Projects on this page.
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    /// Token of the next page, absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A project as listed by Resource Manager.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    /// Project id.
    pub project_id: String,
    /// `ACTIVE`, `DELETE_REQUESTED`, and so on.
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

impl ProjectEntry {
    /// Returns true for projects that are not pending deletion.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle_state.as_deref().map_or(true, |s| s == ACTIVE)
    }
}

/// Returns the `projects.list` filter selecting the direct children of a
/// folder.
#[must_use]
pub fn folder_filter(folder_id: &str) -> String {
    format!("parent.type:folder parent.id:{folder_id}")
}

/// [`ProjectSource`] over the Resource Manager v1 REST API.
#[derive(Debug)]
pub struct RestProjects<'a> {
    http: &'a GcpHttp,
    base: String,
}

impl<'a> RestProjects<'a> {
    /// Creates a client against the default endpoint.
    #[must_use]
    pub fn new(http: &'a GcpHttp) -> Self {
        Self::with_base(http, RESOURCE_MANAGER_BASE)
    }

    /// Creates a client against a custom endpoint.
    #[must_use]
    pub fn with_base(http: &'a GcpHttp, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
        }
    }
}

impl ProjectSource for RestProjects<'_> {
    fn list_folder_projects(&self, folder_id: &str) -> Result<Vec<String>> {
        let url = join_url(&self.base, &["projects"])?;
        let filter = folder_filter(folder_id);
        let mut seen = HashSet::new();
        let mut token: Option<String> = None;
        let mut ids = Vec::new();

        loop {
            let mut query = vec![("filter", filter.as_str())];
            if let Some(token) = token.as_deref() {
                query.push(("pageToken", token));
            }
            let page: ProjectsPage = self.http.get_json(&url, &query)?;

            ids.extend(
                page.projects
                    .into_iter()
                    .filter(ProjectEntry::is_active)
                    .map(|p| p.project_id),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                None => break,
                Some(next) => {
                    if !seen.insert(next.clone()) {
                        return Err(Error::Validation {
                            field: "nextPageToken".into(),
                            message: format!("project listing repeated page token '{next}'"),
                        });
                    }
                    token = Some(next);
                }
            }
        }

        log::debug!("listed folder folder={folder_id} projects={}", ids.len());
        Ok(ids)
    }
}
