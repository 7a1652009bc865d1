//! Per-project reconciliation.
//!
//! The [`Reconciler`] fetches a project's inventory and drives every
//! external address through classification, planning and execution.

use serde::Serialize;

use crate::address::AddressRecord;
use crate::cancel::CancelToken;
use crate::compute::ComputeApi;
use crate::error::Result;

use super::classifier::classify;
use super::executor::{AddressOutcome, PlanExecutor, RecordState};
use super::inventory::InventoryFetcher;
use super::plan::DeletionPlan;
use super::waiter::WaitPolicy;

/// Settings for a reconciliation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOptions {
    /// Record plans without issuing mutating calls.
    pub dry_run: bool,
    /// Polling policy for operations.
    pub wait_policy: WaitPolicy,
    /// Whether the address release operation is awaited.
    pub wait_for_address_release: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            wait_policy: WaitPolicy::default(),
            wait_for_address_release: true,
        }
    }
}

impl ReconcileOptions {
    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the polling policy.
    #[must_use]
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// Sets whether the address release operation is awaited.
    #[must_use]
    pub const fn with_wait_for_address_release(mut self, wait: bool) -> Self {
        self.wait_for_address_release = wait;
        self
    }
}

/// Outcome of reconciling one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    /// Project id.
    pub project: String,
    /// Addresses fully removed.
    pub deleted: usize,
    /// Addresses that ended in the failed state.
    pub failed: usize,
    /// Addresses not processed.
    pub skipped: usize,
    /// Addresses planned in dry-run mode.
    pub planned: usize,
    /// Per-address outcomes in processing order.
    pub outcomes: Vec<AddressOutcome>,
}

impl ProjectReport {
    /// Builds a report and its counts from per-address outcomes.
    #[must_use]
    pub fn from_outcomes(project: impl Into<String>, outcomes: Vec<AddressOutcome>) -> Self {
        let mut report = Self {
            project: project.into(),
            deleted: 0,
            failed: 0,
            skipped: 0,
            planned: 0,
            outcomes: Vec::new(),
        };
        for outcome in &outcomes {
            match outcome.state {
                RecordState::Done => report.deleted += 1,
                RecordState::Failed(_) => report.failed += 1,
                RecordState::Skipped { .. } => report.skipped += 1,
                RecordState::Planned => report.planned += 1,
            }
        }
        report.outcomes = outcomes;
        report
    }

    /// Returns true if any address failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Iterates over the failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &AddressOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

/// Reconciles projects against the compute API.
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::compute::ComputeApi;
/// use ipenforcer::operations::{ReconcileOptions, Reconciler};
/// use ipenforcer::CancelToken;
///
/// fn sweep(api: &dyn ComputeApi) -> ipenforcer::Result<()> {
///     let reconciler = Reconciler::new(api, ReconcileOptions::default().with_dry_run(true));
///     let report = reconciler.reconcile_project("my-project", &CancelToken::new())?;
///     println!("{} planned", report.planned);
///     Ok(())
/// }
/// ```
pub struct Reconciler<'a> {
    api: &'a dyn ComputeApi,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(api: &'a dyn ComputeApi, options: ReconcileOptions) -> Self {
        Self { api, options }
    }

    /// Returns the reconciler's settings.
    #[must_use]
    pub const fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    fn executor(&self) -> PlanExecutor<'a> {
        let executor = PlanExecutor::new(self.api, self.options.wait_policy.clone())
            .with_wait_for_address_release(self.options.wait_for_address_release);
        if self.options.dry_run {
            executor.dry_run()
        } else {
            executor
        }
    }

    /// Fetches a project's inventory and derives a plan for each external
    /// address, without executing anything.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FetchFailure`] if the inventory cannot be
    /// fetched.
    pub fn plan_project(&self, project: &str) -> Result<Vec<(AddressRecord, DeletionPlan)>> {
        let inventory = InventoryFetcher::new(self.api).fetch(project)?;
        Ok(inventory
            .records()
            .filter(|record| record.is_external())
            .map(|record| {
                let plan = DeletionPlan::for_record(record, classify(record));
                (record.clone(), plan)
            })
            .collect())
    }

    /// Brings every external address of `project` into compliance.
    ///
    /// Every scope and every address is processed; one address failing does
    /// not stop its siblings. Once `cancel` fires, remaining addresses are
    /// reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FetchFailure`] if the inventory cannot be
    /// fetched. Per-address failures are recorded in the report instead.
    pub fn reconcile_project(&self, project: &str, cancel: &CancelToken) -> Result<ProjectReport> {
        let inventory = InventoryFetcher::new(self.api).fetch(project)?;
        log::info!(
            "reconciling project={project} addresses={} dry_run={}",
            inventory.len(),
            self.options.dry_run
        );

        let executor = self.executor();
        let mut outcomes = Vec::with_capacity(inventory.len());
        for (scope, records) in inventory.buckets() {
            log::debug!("processing scope project={project} scope={scope} addresses={}", records.len());
            for record in records {
                outcomes.push(self.process(project, record, &executor, cancel));
            }
        }

        let report = ProjectReport::from_outcomes(project, outcomes);
        log::info!(
            "project reconciled project={project} deleted={} failed={} skipped={} planned={}",
            report.deleted,
            report.failed,
            report.skipped,
            report.planned
        );
        Ok(report)
    }

    fn process(
        &self,
        project: &str,
        record: &AddressRecord,
        executor: &PlanExecutor<'_>,
        cancel: &CancelToken,
    ) -> AddressOutcome {
        if cancel.is_cancelled() {
            return AddressOutcome::skipped(record, cancel.reason());
        }
        if !record.is_external() {
            log::debug!(
                "skipping internal address project={project} address={}",
                record.label()
            );
            return AddressOutcome::skipped(record, "internal address");
        }

        let disposition = classify(record);
        log::info!(
            "classified project={project} address={} disposition=\"{disposition}\"",
            record.label()
        );
        let plan = DeletionPlan::for_record(record, disposition);
        executor.execute(project, record, &plan)
    }
}
