//! The compute control API surface the enforcer depends on.
//!
//! Every mutating call returns an [`Operation`] handle that must be polled
//! to completion. The [`ComputeApi`] trait is the seam between the
//! reconciliation engine and the transport: production runs use
//! [`crate::gcp::RestCompute`], tests substitute fakes.

pub mod operation;
pub mod wire;

use std::fmt;

use serde::Serialize;

use crate::address::AddressScope;
use crate::error::Result;

pub use operation::{Operation, OperationError, OperationErrorDetail, OperationStatus};
pub use wire::{AddressPage, RawAddress, ScopedAddresses};

/// Namespace an operation is tracked in.
///
/// Operations live next to the resource they mutate: global resources use
/// global operations, regional resources regional ones, instances zonal ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationScope {
    /// Global operations.
    Global,
    /// Regional operations in the named region.
    Region(String),
    /// Zonal operations in the named zone.
    Zone(String),
}

impl From<&AddressScope> for OperationScope {
    fn from(scope: &AddressScope) -> Self {
        match scope {
            AddressScope::Global => Self::Global,
            AddressScope::Regional(region) => Self::Region(region.clone()),
        }
    }
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Region(region) => write!(f, "regions/{region}"),
            Self::Zone(zone) => write!(f, "zones/{zone}"),
        }
    }
}

/// Logical calls issued against the compute control API.
///
/// Each method performs exactly one request. Implementations must not retry;
/// retry policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
pub trait ComputeApi: Send + Sync {
    /// Fetches one page of the aggregated address listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the page cannot be decoded.
    fn list_addresses<'a>(&self, project: &str, page_token: Option<&'a str>) -> Result<AddressPage>;

    /// Releases an address reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    fn delete_address(&self, project: &str, scope: &AddressScope, name: &str)
        -> Result<Operation>;

    /// Deletes a global or regional forwarding rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    fn delete_forwarding_rule(
        &self,
        project: &str,
        scope: &AddressScope,
        name: &str,
    ) -> Result<Operation>;

    /// Deletes a compute instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    fn delete_instance(&self, project: &str, zone: &str, name: &str) -> Result<Operation>;

    /// Deletes a cloud router.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    fn delete_router(&self, project: &str, region: &str, name: &str) -> Result<Operation>;

    /// Reads the current state of an operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn get_operation(
        &self,
        project: &str,
        scope: &OperationScope,
        name: &str,
    ) -> Result<Operation>;
}
