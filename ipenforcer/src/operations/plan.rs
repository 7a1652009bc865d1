//! Deletion plans.
//!
//! A [`DeletionPlan`] is derived from a [`Disposition`] and lists the
//! ordered delete calls needed to bring one address into compliance. Plans
//! are never persisted.

use serde::Serialize;

use crate::address::{AddressRecord, AddressScope};
use crate::compute::OperationScope;

use super::classifier::Disposition;

/// A single delete call to issue during plan execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    /// Delete a global or regional forwarding rule.
    DeleteForwardingRule {
        /// Where the rule lives.
        scope: AddressScope,
        /// Rule name.
        name: String,
    },
    /// Delete a compute instance.
    DeleteInstance {
        /// Instance zone.
        zone: String,
        /// Instance name.
        name: String,
    },
    /// Delete a cloud router.
    DeleteRouter {
        /// Router region.
        region: String,
        /// Router name.
        name: String,
    },
    /// Release the address reservation itself.
    DeleteAddress {
        /// Where the address lives.
        scope: AddressScope,
        /// Address name.
        name: String,
    },
}

impl PlanAction {
    /// Returns a human-readable description of this action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::DeleteForwardingRule { scope, name } => {
                format!("Delete forwarding rule {name} ({scope})")
            }
            Self::DeleteInstance { zone, name } => format!("Delete instance {name} ({zone})"),
            Self::DeleteRouter { region, name } => format!("Delete router {name} ({region})"),
            Self::DeleteAddress { scope, name } => {
                format!("Release address reservation {name} ({scope})")
            }
        }
    }

    /// Returns the namespace the resulting operation is tracked in.
    #[must_use]
    pub fn operation_scope(&self) -> OperationScope {
        match self {
            Self::DeleteForwardingRule { scope, .. } | Self::DeleteAddress { scope, .. } => {
                OperationScope::from(scope)
            }
            Self::DeleteInstance { zone, .. } => OperationScope::Zone(zone.clone()),
            Self::DeleteRouter { region, .. } => OperationScope::Region(region.clone()),
        }
    }

    /// Returns true for actions that remove a consumer rather than the address.
    #[must_use]
    pub fn is_consumer_step(&self) -> bool {
        !matches!(self, Self::DeleteAddress { .. })
    }
}

/// The ordered actions for one address.
///
/// Holds zero actions for unsupported addresses, one for free reservations,
/// and two (consumer first, then the address) for addresses in use.
///
/// # Examples
///
/// ```
/// use ipenforcer::operations::{classify, DeletionPlan};
/// use ipenforcer::{AddressRecord, AddressScope};
///
/// let record = AddressRecord::new("ip-a", AddressScope::Global);
/// let plan = DeletionPlan::for_record(&record, classify(&record));
/// assert_eq!(plan.len(), 1);
/// assert!(plan.consumer_step().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    /// Name of the address the plan applies to.
    pub address: String,
    /// The disposition the plan was derived from.
    pub disposition: Disposition,
    /// The sequence of actions to perform.
    pub actions: Vec<PlanAction>,
}

impl DeletionPlan {
    /// Creates an empty plan for the given address.
    #[must_use]
    pub fn new(address: impl Into<String>, disposition: Disposition) -> Self {
        Self {
            address: address.into(),
            disposition,
            actions: Vec::new(),
        }
    }

    /// Builds the plan implied by a record's disposition.
    #[must_use]
    pub fn for_record(record: &AddressRecord, disposition: Disposition) -> Self {
        let consumer = match &disposition {
            Disposition::Unsupported { .. } => {
                return Self::new(&record.name, disposition);
            }
            Disposition::FreeGlobal | Disposition::FreeRegional { .. } => None,
            Disposition::InUseGlobalForwardingRule { consumer } => {
                Some(PlanAction::DeleteForwardingRule {
                    scope: AddressScope::Global,
                    name: consumer.clone(),
                })
            }
            Disposition::InUseRegionalForwardingRule { zone, consumer, .. } => {
                Some(PlanAction::DeleteForwardingRule {
                    scope: AddressScope::Regional(zone.clone()),
                    name: consumer.clone(),
                })
            }
            Disposition::InUseInstance { zone, consumer, .. } => {
                Some(PlanAction::DeleteInstance {
                    zone: zone.clone(),
                    name: consumer.clone(),
                })
            }
            Disposition::InUseRouter { zone, consumer, .. } => Some(PlanAction::DeleteRouter {
                region: zone.clone(),
                name: consumer.clone(),
            }),
        };

        let release = PlanAction::DeleteAddress {
            scope: record.scope.clone(),
            name: record.name.clone(),
        };

        let mut plan = Self::new(&record.name, disposition);
        if let Some(consumer) = consumer {
            plan = plan.add_action(consumer);
        }
        plan.add_action(release)
    }

    /// Adds an action to the plan.
    #[must_use]
    pub fn add_action(mut self, action: PlanAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns the consumer delete, if the plan has one.
    ///
    /// Only dispositions that name a consumer yield one.
    #[must_use]
    pub fn consumer_step(&self) -> Option<&PlanAction> {
        if !self.disposition.has_consumer() {
            return None;
        }
        self.actions.iter().find(|a| a.is_consumer_step())
    }

    /// Returns the address release, if the plan has one.
    #[must_use]
    pub fn address_step(&self) -> Option<&PlanAction> {
        self.actions.iter().find(|a| !a.is_consumer_step())
    }

    /// Checks if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }
}
