//! Typed delete calls.
//!
//! The [`ResourceDeleter`] turns one [`PlanAction`] into exactly one
//! mutating request and hands back the resulting [`Operation`]. It never
//! retries and never waits.

use crate::compute::{ComputeApi, Operation};
use crate::error::{Error, Result};

use super::plan::PlanAction;

/// Issues the delete request for each kind of plan action.
pub struct ResourceDeleter<'a> {
    api: &'a dyn ComputeApi,
}

impl<'a> ResourceDeleter<'a> {
    /// Creates a deleter issuing requests through `api`.
    #[must_use]
    pub fn new(api: &'a dyn ComputeApi) -> Self {
        Self { api }
    }

    /// Issues the delete request for `action` in `project`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeleteFailure`] wrapping the underlying cause if the
    /// request is rejected.
    pub fn delete(&self, project: &str, action: &PlanAction) -> Result<Operation> {
        log::info!(
            "issuing delete project={project} action=\"{}\"",
            action.description()
        );

        self.dispatch(project, action)
            .map_err(|source| Error::DeleteFailure {
                resource: action.description(),
                source: Box::new(source),
            })
            .inspect_err(|err| log::error!("delete rejected project={project} error={err}"))
    }

    fn dispatch(&self, project: &str, action: &PlanAction) -> Result<Operation> {
        match action {
            PlanAction::DeleteForwardingRule { scope, name } => {
                self.api.delete_forwarding_rule(project, scope, name)
            }
            PlanAction::DeleteInstance { zone, name } => {
                self.api.delete_instance(project, zone, name)
            }
            PlanAction::DeleteRouter { region, name } => {
                self.api.delete_router(project, region, name)
            }
            PlanAction::DeleteAddress { scope, name } => {
                self.api.delete_address(project, scope, name)
            }
        }
    }
}
