//! Address classification.
//!
//! Maps one [`AddressRecord`] to the [`Disposition`] that decides what, if
//! anything, the enforcer deletes. Classification is pure: it never calls
//! the network and never mutates its input.

use std::fmt;

use serde::Serialize;

use crate::address::{
    AddressRecord, AddressScope, AddressStatus, ConsumerKind, ConsumerLocation, ConsumerRef,
};

/// The actionable category derived from an address's raw state.
///
/// Every variant carries all the fields its deletion branch needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    /// Reserved global address with no consumer.
    FreeGlobal,
    /// Reserved regional address with no consumer.
    FreeRegional {
        /// Region of the address.
        region: String,
    },
    /// Global address attached to a global forwarding rule.
    InUseGlobalForwardingRule {
        /// Forwarding rule name.
        consumer: String,
    },
    /// Regional address attached to a regional forwarding rule.
    InUseRegionalForwardingRule {
        /// Region of the address.
        region: String,
        /// Location of the forwarding rule.
        zone: String,
        /// Forwarding rule name.
        consumer: String,
    },
    /// Regional address attached to a compute instance.
    InUseInstance {
        /// Region of the address.
        region: String,
        /// Zone of the instance.
        zone: String,
        /// Instance name.
        consumer: String,
    },
    /// Regional address attached to a cloud router.
    InUseRouter {
        /// Region of the address.
        region: String,
        /// Location of the router.
        zone: String,
        /// Router name.
        consumer: String,
    },
    /// No safe action could be derived; the address is left untouched.
    Unsupported {
        /// Why the address was not actionable.
        reason: String,
    },
}

impl Disposition {
    /// Returns true unless the disposition is [`Disposition::Unsupported`].
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }

    /// Returns true if a consumer must be deleted before the address.
    #[must_use]
    pub fn has_consumer(&self) -> bool {
        matches!(
            self,
            Self::InUseGlobalForwardingRule { .. }
                | Self::InUseRegionalForwardingRule { .. }
                | Self::InUseInstance { .. }
                | Self::InUseRouter { .. }
        )
    }

    fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeGlobal => write!(f, "free global reservation"),
            Self::FreeRegional { region } => write!(f, "free reservation in {region}"),
            Self::InUseGlobalForwardingRule { consumer } => {
                write!(f, "in use by global forwarding rule {consumer}")
            }
            Self::InUseRegionalForwardingRule { zone, consumer, .. } => {
                write!(f, "in use by forwarding rule {consumer} in {zone}")
            }
            Self::InUseInstance { zone, consumer, .. } => {
                write!(f, "in use by instance {consumer} in {zone}")
            }
            Self::InUseRouter { zone, consumer, .. } => {
                write!(f, "in use by router {consumer} in {zone}")
            }
            Self::Unsupported { reason } => write!(f, "unsupported: {reason}"),
        }
    }
}

/// Classifies an address record.
///
/// # Examples
///
/// ```
/// use ipenforcer::operations::{classify, Disposition};
/// use ipenforcer::{AddressRecord, AddressScope};
///
/// let record = AddressRecord::new("ip-a", AddressScope::Global);
/// assert_eq!(classify(&record), Disposition::FreeGlobal);
/// ```
#[must_use]
pub fn classify(record: &AddressRecord) -> Disposition {
    match &record.status {
        AddressStatus::Reserved => classify_reserved(record),
        AddressStatus::InUse => classify_in_use(record),
        AddressStatus::Other(status) => {
            Disposition::unsupported(format!("status {status} is not actionable"))
        }
    }
}

fn classify_reserved(record: &AddressRecord) -> Disposition {
    if !record.users.is_empty() {
        return Disposition::unsupported("reserved address still lists consumers");
    }
    match &record.scope {
        AddressScope::Global => Disposition::FreeGlobal,
        AddressScope::Regional(region) => Disposition::FreeRegional {
            region: region.clone(),
        },
    }
}

fn classify_in_use(record: &AddressRecord) -> Disposition {
    let url = match record.users.as_slice() {
        [] => return Disposition::unsupported("address is in use but lists no consumer"),
        [url] => url,
        many => {
            return Disposition::unsupported(format!(
                "address is in use by {} consumers",
                many.len()
            ))
        }
    };

    let Some(consumer) = ConsumerRef::parse(url) else {
        return Disposition::unsupported(format!("unrecognised consumer URL {url}"));
    };

    let ConsumerRef {
        kind,
        name,
        location,
    } = consumer;

    match (kind, location, &record.scope) {
        (ConsumerKind::ForwardingRule, ConsumerLocation::Global, AddressScope::Global) => {
            Disposition::InUseGlobalForwardingRule { consumer: name }
        }
        (
            ConsumerKind::ForwardingRule,
            ConsumerLocation::Region(zone),
            AddressScope::Regional(region),
        ) if zone == *region => Disposition::InUseRegionalForwardingRule {
            region: region.clone(),
            zone,
            consumer: name,
        },
        (ConsumerKind::Instance, ConsumerLocation::Zone(zone), AddressScope::Regional(region))
            if zone_in_region(&zone, region) =>
        {
            Disposition::InUseInstance {
                region: region.clone(),
                zone,
                consumer: name,
            }
        }
        (ConsumerKind::Router, ConsumerLocation::Region(zone), AddressScope::Regional(region))
            if zone == *region =>
        {
            Disposition::InUseRouter {
                region: region.clone(),
                zone,
                consumer: name,
            }
        }
        (ConsumerKind::Other(collection), _, _) => {
            Disposition::unsupported(format!("consumer kind {collection} is not supported"))
        }
        (kind, location, scope) => Disposition::unsupported(format!(
            "{kind} {name} in {} does not match {scope} address scope",
            location.name()
        )),
    }
}

/// Zones are named `<region>-<suffix>`.
fn zone_in_region(zone: &str, region: &str) -> bool {
    zone.strip_prefix(region)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|suffix| !suffix.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.googleapis.com/compute/v1/projects/p";

    fn regional(name: &str, region: &str) -> AddressRecord {
        AddressRecord::new(name, AddressScope::Regional(region.into()))
    }

    fn in_use(record: AddressRecord, user: &str) -> AddressRecord {
        record
            .with_status(AddressStatus::InUse)
            .with_user(format!("{BASE}/{user}"))
    }

    #[test]
    fn test_free_global() {
        let record = AddressRecord::new("ip-a", AddressScope::Global);
        assert_eq!(classify(&record), Disposition::FreeGlobal);
    }

    #[test]
    fn test_free_regional() {
        assert_eq!(
            classify(&regional("ip-r", "us-east4")),
            Disposition::FreeRegional {
                region: "us-east4".into()
            }
        );
    }

    #[test]
    fn test_global_forwarding_rule() {
        let record = in_use(
            AddressRecord::new("ip-g", AddressScope::Global),
            "global/forwardingRules/fr-g",
        );
        assert_eq!(
            classify(&record),
            Disposition::InUseGlobalForwardingRule {
                consumer: "fr-g".into()
            }
        );
    }

    #[test]
    fn test_regional_forwarding_rule() {
        let record = in_use(
            regional("ip-b", "us-central1"),
            "regions/us-central1/forwardingRules/fr-1",
        );
        assert_eq!(
            classify(&record),
            Disposition::InUseRegionalForwardingRule {
                region: "us-central1".into(),
                zone: "us-central1".into(),
                consumer: "fr-1".into()
            }
        );
    }

    #[test]
    fn test_instance() {
        let record = in_use(
            regional("ip-vm", "europe-west1"),
            "zones/europe-west1-b/instances/vm-1",
        );
        assert_eq!(
            classify(&record),
            Disposition::InUseInstance {
                region: "europe-west1".into(),
                zone: "europe-west1-b".into(),
                consumer: "vm-1".into()
            }
        );
    }

    #[test]
    fn test_router() {
        let record = in_use(
            regional("ip-nat", "us-west2"),
            "regions/us-west2/routers/nat-router",
        );
        assert_eq!(
            classify(&record),
            Disposition::InUseRouter {
                region: "us-west2".into(),
                zone: "us-west2".into(),
                consumer: "nat-router".into()
            }
        );
    }

    #[test]
    fn test_instance_group_is_unsupported() {
        let record = in_use(
            regional("ip-c", "us-central1"),
            "zones/us-central1-a/instanceGroups/ig-1",
        );
        let disposition = classify(&record);
        assert!(!disposition.is_supported());
        assert!(disposition.to_string().contains("instanceGroups"));
    }

    #[test]
    fn test_global_address_on_instance_is_unsupported() {
        let record = in_use(
            AddressRecord::new("ip-odd", AddressScope::Global),
            "zones/us-central1-a/instances/vm-1",
        );
        assert!(!classify(&record).is_supported());
    }

    #[test]
    fn test_instance_in_other_region_is_unsupported() {
        let record = in_use(
            regional("ip-x", "us-central1"),
            "zones/us-east1-b/instances/vm-1",
        );
        assert!(!classify(&record).is_supported());
    }

    #[test]
    fn test_region_prefix_is_not_enough() {
        // us-central1 is a prefix of us-central10 but not its region.
        assert!(!zone_in_region("us-central10-a", "us-central1"));
        assert!(zone_in_region("us-central1-f", "us-central1"));
        assert!(!zone_in_region("us-central1-", "us-central1"));
    }

    #[test]
    fn test_in_use_without_consumer_is_unsupported() {
        let record = regional("ip-empty", "us-central1").with_status(AddressStatus::InUse);
        assert!(!classify(&record).is_supported());
    }

    #[test]
    fn test_multiple_consumers_are_unsupported() {
        let record = in_use(
            regional("ip-shared", "us-central1"),
            "regions/us-central1/forwardingRules/fr-1",
        )
        .with_user(format!("{BASE}/regions/us-central1/forwardingRules/fr-2"));
        let disposition = classify(&record);
        assert!(disposition.to_string().contains("2 consumers"));
    }

    #[test]
    fn test_reserved_with_users_is_unsupported() {
        let record = regional("ip-stale", "us-central1")
            .with_user(format!("{BASE}/regions/us-central1/routers/r"));
        assert!(!classify(&record).is_supported());
    }

    #[test]
    fn test_transitional_status_is_unsupported() {
        let record = AddressRecord::new("ip-new", AddressScope::Global)
            .with_status(AddressStatus::Other("RESERVING".into()));
        assert_eq!(
            classify(&record),
            Disposition::Unsupported {
                reason: "status RESERVING is not actionable".into()
            }
        );
    }

    #[test]
    fn test_has_consumer() {
        assert!(!Disposition::FreeGlobal.has_consumer());
        assert!(Disposition::InUseGlobalForwardingRule {
            consumer: "fr".into()
        }
        .has_consumer());
        assert!(!Disposition::Unsupported {
            reason: "x".into()
        }
        .has_consumer());
    }
}
