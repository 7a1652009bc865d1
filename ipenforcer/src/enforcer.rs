//! Multi-project enforcement runs.
//!
//! The [`Enforcer`] reconciles a list of projects, one after another or on a
//! bounded pool of scoped worker threads. Addresses within a project are
//! always processed sequentially.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use serde::Serialize;

use crate::cancel::CancelToken;
use crate::compute::ComputeApi;
use crate::error::Error;
use crate::operations::{ProjectReport, ReconcileOptions, Reconciler};

/// What happened to one project during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProjectResult {
    /// The inventory was fetched and every address processed.
    Completed(ProjectReport),
    /// The inventory could not be fetched; nothing was touched.
    FetchFailed {
        /// Project id.
        project: String,
        /// Error message.
        error: String,
    },
    /// The project was not started because the run was cancelled.
    Cancelled {
        /// Project id.
        project: String,
        /// Cancellation reason.
        reason: String,
    },
}

impl ProjectResult {
    /// Returns the project id.
    #[must_use]
    pub fn project(&self) -> &str {
        match self {
            Self::Completed(report) => &report.project,
            Self::FetchFailed { project, .. } | Self::Cancelled { project, .. } => project,
        }
    }

    /// Returns the report of a completed project.
    #[must_use]
    pub fn report(&self) -> Option<&ProjectReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// The outcome of a whole enforcement run, in input project order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// One entry per input project.
    pub projects: Vec<ProjectResult>,
}

impl RunReport {
    fn reports(&self) -> impl Iterator<Item = &ProjectReport> {
        self.projects.iter().filter_map(ProjectResult::report)
    }

    /// Total number of addresses deleted.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.reports().map(|r| r.deleted).sum()
    }

    /// Total number of addresses that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.reports().map(|r| r.failed).sum()
    }

    /// Total number of addresses planned in dry-run mode.
    #[must_use]
    pub fn planned(&self) -> usize {
        self.reports().map(|r| r.planned).sum()
    }

    /// Total number of addresses skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.reports().map(|r| r.skipped).sum()
    }

    /// Number of projects whose inventory could not be fetched.
    #[must_use]
    pub fn fetch_failures(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| matches!(p, ProjectResult::FetchFailed { .. }))
            .count()
    }

    /// Number of projects never started.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| matches!(p, ProjectResult::Cancelled { .. }))
            .count()
    }

    /// Returns true if any address failed or any project could not be
    /// fetched.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || self.fetch_failures() > 0
    }
}

/// Runs reconciliation across projects.
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::compute::ComputeApi;
/// use ipenforcer::operations::ReconcileOptions;
/// use ipenforcer::{CancelToken, Enforcer};
///
/// fn run(api: &dyn ComputeApi, projects: &[String]) {
///     let enforcer = Enforcer::new(api, ReconcileOptions::default()).with_max_parallel(4);
///     let report = enforcer.run(projects, &CancelToken::new());
///     println!("{} deleted, {} failed", report.deleted(), report.failed());
/// }
/// ```
pub struct Enforcer<'a> {
    api: &'a dyn ComputeApi,
    options: ReconcileOptions,
    max_parallel: usize,
}

impl<'a> Enforcer<'a> {
    /// Creates a sequential enforcer.
    #[must_use]
    pub fn new(api: &'a dyn ComputeApi, options: ReconcileOptions) -> Self {
        Self {
            api,
            options,
            max_parallel: 1,
        }
    }

    /// Sets how many projects may be processed at once. Zero is treated as one.
    #[must_use]
    pub const fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = if max_parallel == 0 { 1 } else { max_parallel };
        self
    }

    /// Reconciles every project in `projects`.
    ///
    /// A project whose inventory fetch fails is recorded and skipped. Projects
    /// not started before `cancel` fires are recorded as cancelled.
    #[must_use]
    pub fn run(&self, projects: &[String], cancel: &CancelToken) -> RunReport {
        log::info!(
            "starting enforcement run projects={} parallel={} dry_run={}",
            projects.len(),
            self.max_parallel,
            self.options.dry_run
        );

        let reconciler = Reconciler::new(self.api, self.options.clone());
        let workers = self.max_parallel.min(projects.len());
        let results = if workers <= 1 {
            projects
                .iter()
                .map(|project| Self::run_project(&reconciler, project, cancel))
                .collect()
        } else {
            Self::run_parallel(&reconciler, projects, cancel, workers)
        };

        let report = RunReport {
            dry_run: self.options.dry_run,
            projects: results,
        };
        log::info!(
            "enforcement run finished deleted={} failed={} planned={} fetch_failures={} cancelled={}",
            report.deleted(),
            report.failed(),
            report.planned(),
            report.fetch_failures(),
            report.cancelled()
        );
        report
    }

    fn run_parallel(
        reconciler: &Reconciler<'_>,
        projects: &[String],
        cancel: &CancelToken,
        workers: usize,
    ) -> Vec<ProjectResult> {
        let next = AtomicUsize::new(0);
        let finished = Mutex::new(Vec::with_capacity(projects.len()));

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(project) = projects.get(index) else {
                        break;
                    };
                    let result = Self::run_project(reconciler, project, cancel);
                    finished
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .push((index, result));
                });
            }
        });

        let mut finished = finished
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        finished.sort_by_key(|(index, _)| *index);
        finished.into_iter().map(|(_, result)| result).collect()
    }

    fn run_project(
        reconciler: &Reconciler<'_>,
        project: &str,
        cancel: &CancelToken,
    ) -> ProjectResult {
        if cancel.is_cancelled() {
            log::warn!("project not started project={project} reason=\"{}\"", cancel.reason());
            return ProjectResult::Cancelled {
                project: project.to_string(),
                reason: cancel.reason().to_string(),
            };
        }

        match reconciler.reconcile_project(project, cancel) {
            Ok(report) => ProjectResult::Completed(report),
            Err(error) => {
                let message = match &error {
                    Error::FetchFailure { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                ProjectResult::FetchFailed {
                    project: project.to_string(),
                    error: message,
                }
            }
        }
    }
}
