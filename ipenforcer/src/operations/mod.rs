//! Address enforcement using the plan-execute pattern.
//!
//! Each address moves through two phases:
//! 1. **Planning**: [`classify`] derives a [`Disposition`] and
//!    [`DeletionPlan::for_record`] turns it into ordered [`PlanAction`]s
//! 2. **Execution**: [`PlanExecutor`] issues each delete and waits for its
//!    operation before moving on
//!
//! Keeping the phases apart is what makes dry-run mode and the `plan`
//! command possible.
//!
//! # Examples
//!
//! ```no_run
//! use ipenforcer::compute::ComputeApi;
//! use ipenforcer::operations::{ReconcileOptions, Reconciler};
//! use ipenforcer::CancelToken;
//!
//! fn enforce(api: &dyn ComputeApi) -> ipenforcer::Result<()> {
//!     let reconciler = Reconciler::new(api, ReconcileOptions::default());
//!
//!     // Preview
//!     for (record, plan) in reconciler.plan_project("my-project")? {
//!         println!("{}: {} action(s)", record.name, plan.len());
//!     }
//!
//!     // Enforce
//!     let report = reconciler.reconcile_project("my-project", &CancelToken::new())?;
//!     println!("{} deleted, {} failed", report.deleted, report.failed);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod deleter;
pub mod executor;
pub mod inventory;
pub mod plan;
pub mod reconcile;
pub mod waiter;

#[cfg(test)]
mod proptests;

pub use classifier::{classify, Disposition};
pub use deleter::ResourceDeleter;
pub use executor::{AddressOutcome, Failure, PlanExecutor, RecordState, Stage};
pub use inventory::InventoryFetcher;
pub use plan::{DeletionPlan, PlanAction};
pub use reconcile::{ProjectReport, ReconcileOptions, Reconciler};
pub use waiter::{OperationWaiter, WaitPolicy};
