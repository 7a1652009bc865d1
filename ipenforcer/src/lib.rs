#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # ipenforcer
//!
//! A library for enforcing the managed external IP policy.
//!
//! Every external address reserved in an enforced project is released. An
//! address still attached to a forwarding rule, instance or router has that
//! consumer deleted first, and the release is only issued once the
//! consumer's delete operation has completed. Addresses whose consumer
//! cannot be handled safely are reported and left in place.
//!
//! ## Core Types
//!
//! - [`AddressRecord`] and [`Inventory`]: the address model
//! - [`operations::Disposition`] and [`operations::DeletionPlan`]: what to delete, in order
//! - [`operations::Reconciler`] and [`Enforcer`]: per-project and multi-project runs
//! - [`compute::ComputeApi`]: the seam to the cloud control API
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use ipenforcer::operations::{classify, DeletionPlan, Disposition};
//! use ipenforcer::{AddressRecord, AddressScope, AddressStatus};
//!
//! let record = AddressRecord::new("ip-b", AddressScope::Regional("us-central1".into()))
//!     .with_status(AddressStatus::InUse)
//!     .with_user("https://www.googleapis.com/compute/v1/projects/p/regions/us-central1/forwardingRules/fr-1");
//!
//! let disposition = classify(&record);
//! assert!(matches!(disposition, Disposition::InUseRegionalForwardingRule { .. }));
//!
//! let plan = DeletionPlan::for_record(&record, disposition);
//! assert_eq!(plan.len(), 2);
//! ```

pub mod address;
pub mod cancel;
pub mod compute;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod gcp;
pub mod logging;
pub mod operations;
pub mod selection;

// Re-export key types at crate root for convenience
pub use address::{
    AddressRecord, AddressScope, AddressStatus, AddressType, ConsumerKind, ConsumerLocation,
    ConsumerRef, Inventory,
};
pub use cancel::CancelToken;
pub use config::{Config, ConfigLoader};
pub use enforcer::{Enforcer, ProjectResult, RunReport};
pub use error::{Error, FailureKind, Result};
pub use logging::{init_logger, LogLevel};
pub use operations::{
    AddressOutcome, DeletionPlan, Disposition, PlanAction, PlanExecutor, ProjectReport,
    ReconcileOptions, Reconciler, WaitPolicy,
};
pub use selection::{ExclusionSet, ProjectSelector};
