//! Plan execution engine.
//!
//! This module drives the per-address state machine:
//!
//! ```text
//! Classified → ConsumerDeleting → ConsumerWaitDone → AddressDeleting → Done
//!       └────────────── Failed (from any stage) ─────────────┘
//! ```
//!
//! Free reservations skip the consumer stages. Unsupported addresses fail
//! at `Classified` without issuing any request. The address release is only
//! issued once the consumer's delete operation has completed successfully.

use std::fmt;

use serde::Serialize;

use crate::address::{AddressRecord, AddressScope};
use crate::compute::ComputeApi;
use crate::error::{Error, FailureKind};

use super::classifier::Disposition;
use super::deleter::ResourceDeleter;
use super::plan::{DeletionPlan, PlanAction};
use super::waiter::{OperationWaiter, WaitPolicy};

/// Non-terminal stages of the per-address state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The address has a disposition.
    Classified,
    /// The consumer delete request is being issued.
    ConsumerDeleting,
    /// Waiting for the consumer delete operation to finish.
    ConsumerWaitDone,
    /// The address release is being issued (and awaited).
    AddressDeleting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Classified => "classified",
            Self::ConsumerDeleting => "consumer-deleting",
            Self::ConsumerWaitDone => "consumer-wait-done",
            Self::AddressDeleting => "address-deleting",
        };
        f.write_str(name)
    }
}

/// Why an address ended in the failed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Stage the failure occurred in.
    pub stage: Stage,
    /// Failure category.
    pub kind: FailureKind,
    /// Error message.
    pub message: String,
}

/// Terminal state of one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordState {
    /// Every planned delete completed.
    Done,
    /// Dry run: the plan was recorded but not executed.
    Planned,
    /// Not processed at all.
    Skipped {
        /// Why the address was skipped.
        reason: String,
    },
    /// Processing stopped on an error.
    Failed(Failure),
}

/// What happened to one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressOutcome {
    /// Address name.
    pub name: String,
    /// The IP address.
    pub address: String,
    /// Address scope.
    pub scope: AddressScope,
    /// Disposition, absent for addresses skipped before classification.
    pub disposition: Option<Disposition>,
    /// Stages visited, in order.
    pub trail: Vec<Stage>,
    /// Terminal state.
    pub state: RecordState,
    /// Descriptions of the actions completed (or planned, in dry-run mode).
    pub actions_taken: Vec<String>,
}

impl AddressOutcome {
    /// Creates an outcome for an address that was never classified.
    #[must_use]
    pub fn skipped(record: &AddressRecord, reason: impl Into<String>) -> Self {
        Self {
            name: record.name.clone(),
            address: record.address.clone(),
            scope: record.scope.clone(),
            disposition: None,
            trail: Vec::new(),
            state: RecordState::Skipped {
                reason: reason.into(),
            },
            actions_taken: Vec::new(),
        }
    }

    /// Returns true if the address ended in the failed state.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, RecordState::Failed(_))
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            RecordState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Tracks one address through the state machine.
struct Run {
    outcome: AddressOutcome,
}

impl Run {
    fn start(record: &AddressRecord, disposition: &Disposition) -> Self {
        Self {
            outcome: AddressOutcome {
                name: record.name.clone(),
                address: record.address.clone(),
                scope: record.scope.clone(),
                disposition: Some(disposition.clone()),
                trail: vec![Stage::Classified],
                state: RecordState::Done,
                actions_taken: Vec::new(),
            },
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.outcome.trail.push(stage);
    }

    fn stage(&self) -> Stage {
        self.outcome
            .trail
            .last()
            .copied()
            .unwrap_or(Stage::Classified)
    }

    fn completed(&mut self, action: &PlanAction) {
        self.outcome.actions_taken.push(action.description());
    }

    fn fail(mut self, kind: FailureKind, message: String) -> AddressOutcome {
        self.outcome.state = RecordState::Failed(Failure {
            stage: self.stage(),
            kind,
            message,
        });
        self.outcome
    }

    fn fail_with(self, error: &Error) -> AddressOutcome {
        self.fail(error.failure_kind(), error.to_string())
    }

    fn finish(mut self, state: RecordState) -> AddressOutcome {
        self.outcome.state = state;
        self.outcome
    }
}

/// Executes deletion plans against the compute API.
///
/// The executor can run in normal mode (issuing deletes) or dry-run mode
/// (recording the plan without any mutating call).
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::compute::ComputeApi;
/// use ipenforcer::operations::{classify, DeletionPlan, PlanExecutor, WaitPolicy};
/// use ipenforcer::AddressRecord;
///
/// fn enforce(api: &dyn ComputeApi, record: &AddressRecord) {
///     let plan = DeletionPlan::for_record(record, classify(record));
///     let executor = PlanExecutor::new(api, WaitPolicy::default()).dry_run();
///     let outcome = executor.execute("my-project", record, &plan);
///     println!("{:?}", outcome.state);
/// }
/// ```
pub struct PlanExecutor<'a> {
    deleter: ResourceDeleter<'a>,
    waiter: OperationWaiter<'a>,
    dry_run: bool,
    wait_for_address_release: bool,
}

impl<'a> PlanExecutor<'a> {
    /// Creates a new plan executor.
    #[must_use]
    pub fn new(api: &'a dyn ComputeApi, policy: WaitPolicy) -> Self {
        Self {
            deleter: ResourceDeleter::new(api),
            waiter: OperationWaiter::new(api, policy),
            dry_run: false,
            wait_for_address_release: true,
        }
    }

    /// Sets the executor to dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Sets whether the address release operation is awaited.
    ///
    /// Consumer deletes are always awaited.
    #[must_use]
    pub const fn with_wait_for_address_release(mut self, wait: bool) -> Self {
        self.wait_for_address_release = wait;
        self
    }

    /// Returns true if the executor is in dry-run mode.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Executes the plan for one address.
    ///
    /// Errors never escape: they are recorded in the returned outcome so the
    /// caller can continue with sibling addresses.
    #[must_use]
    pub fn execute(
        &self,
        project: &str,
        record: &AddressRecord,
        plan: &DeletionPlan,
    ) -> AddressOutcome {
        let mut run = Run::start(record, &plan.disposition);

        if let Disposition::Unsupported { reason } = &plan.disposition {
            let error = Error::Unsupported {
                address: record.name.clone(),
                reason: reason.clone(),
            };
            log::error!(
                "address left in place project={project} address={} error={error}",
                record.label()
            );
            return run.fail_with(&error);
        }

        let Some(release) = plan.address_step() else {
            return run.fail(
                FailureKind::Other,
                format!("plan for {} has no address release", record.name),
            );
        };

        if self.dry_run {
            for action in &plan.actions {
                log::info!(
                    "dry run project={project} address={} action=\"{}\"",
                    record.label(),
                    action.description()
                );
                run.completed(action);
            }
            return run.finish(RecordState::Planned);
        }

        if let Some(consumer) = plan.consumer_step() {
            log::info!(
                "deleting consumer project={project} address={} consumer=\"{}\"",
                record.label(),
                consumer.description()
            );
            run.enter(Stage::ConsumerDeleting);
            let operation = match self.deleter.delete(project, consumer) {
                Ok(operation) => operation,
                Err(error) => return run.fail_with(&error),
            };

            run.enter(Stage::ConsumerWaitDone);
            if let Err(error) = self
                .waiter
                .wait(project, &consumer.operation_scope(), operation)
            {
                log::error!(
                    "consumer delete did not complete project={project} address={} error={error}",
                    record.label()
                );
                return run.fail_with(&error);
            }
            run.completed(consumer);
            log::warn!(
                "deleted consumer project={project} address={} consumer=\"{}\"",
                record.label(),
                consumer.description()
            );
        }

        log::info!(
            "releasing address project={project} address={} scope={}",
            record.label(),
            record.scope
        );
        run.enter(Stage::AddressDeleting);
        let operation = match self.deleter.delete(project, release) {
            Ok(operation) => operation,
            Err(error) => return run.fail_with(&error),
        };
        if self.wait_for_address_release {
            if let Err(error) = self
                .waiter
                .wait(project, &release.operation_scope(), operation)
            {
                log::error!(
                    "address release did not complete project={project} address={} error={error}",
                    record.label()
                );
                return run.fail_with(&error);
            }
        }
        run.completed(release);
        log::warn!(
            "deleted address project={project} address={} name={} scope={}",
            record.label(),
            record.name,
            record.scope
        );

        run.finish(RecordState::Done)
    }
}
