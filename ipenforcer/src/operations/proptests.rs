//! Property-based tests for the operations module.
//!
//! These tests focus on classifier totality and on the shape of the plans it
//! leads to.

use crate::address::{AddressRecord, AddressScope, AddressStatus};
use crate::operations::{classify, DeletionPlan, Disposition, PlanAction};
use proptest::prelude::*;

const BASE: &str = "https://www.googleapis.com/compute/v1/projects/p";

fn region_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("us-central1".to_string()),
        Just("us-east1".to_string()),
        Just("europe-west4".to_string()),
    ]
}

fn scope_strategy() -> impl Strategy<Value = AddressScope> {
    prop_oneof![
        Just(AddressScope::Global),
        region_strategy().prop_map(AddressScope::Regional),
    ]
}

fn status_strategy() -> impl Strategy<Value = AddressStatus> {
    prop_oneof![
        Just(AddressStatus::Reserved),
        Just(AddressStatus::InUse),
        "[A-Z_]{1,12}".prop_map(|s| AddressStatus::parse(&s)),
    ]
}

// Consumer URLs, both well-formed and garbage
fn user_strategy() -> impl Strategy<Value = String> {
    let collection = prop_oneof![
        Just("forwardingRules"),
        Just("instances"),
        Just("routers"),
        Just("instanceGroups"),
        Just("targetPools"),
    ];
    let location = prop_oneof![
        Just("global".to_string()),
        region_strategy().prop_map(|r| format!("regions/{r}")),
        region_strategy().prop_map(|r| format!("zones/{r}-b")),
    ];
    prop_oneof![
        (location, collection, "[a-z][a-z0-9-]{0,10}")
            .prop_map(|(loc, kind, name)| format!("{BASE}/{loc}/{kind}/{name}")),
        "[a-z/:.]{0,30}",
    ]
}

fn record_strategy() -> impl Strategy<Value = AddressRecord> {
    (
        "[a-z][a-z0-9-]{0,10}",
        scope_strategy(),
        status_strategy(),
        prop::collection::vec(user_strategy(), 0..3),
    )
        .prop_map(|(name, scope, status, users)| {
            users
                .into_iter()
                .fold(AddressRecord::new(name, scope).with_status(status), |r, u| {
                    r.with_user(u)
                })
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Every record gets a disposition and the plan shape follows from it
    #[test]
    fn plan_shape_follows_disposition(record in record_strategy()) {
        let disposition = classify(&record);
        let plan = DeletionPlan::for_record(&record, disposition.clone());

        match disposition {
            Disposition::Unsupported { .. } => prop_assert!(plan.is_empty()),
            Disposition::FreeGlobal | Disposition::FreeRegional { .. } => {
                prop_assert_eq!(plan.len(), 1);
                prop_assert!(plan.consumer_step().is_none());
            }
            _ => {
                prop_assert_eq!(plan.len(), 2);
                prop_assert!(plan.actions[0].is_consumer_step());
            }
        }
    }

    // The release always targets the record itself, and always comes last
    #[test]
    fn release_targets_record(record in record_strategy()) {
        let plan = DeletionPlan::for_record(&record, classify(&record));
        if let Some(last) = plan.actions.last() {
            prop_assert_eq!(
                last,
                &PlanAction::DeleteAddress {
                    scope: record.scope.clone(),
                    name: record.name.clone(),
                }
            );
        }
    }

    // Only in-use addresses with exactly one consumer ever delete a consumer
    #[test]
    fn consumer_requires_single_user(record in record_strategy()) {
        if classify(&record).has_consumer() {
            prop_assert_eq!(&record.status, &AddressStatus::InUse);
            prop_assert_eq!(record.users.len(), 1);
        }
    }

    // Reserved addresses never delete a consumer
    #[test]
    fn reserved_never_deletes_consumer(
        name in "[a-z]{1,8}",
        scope in scope_strategy(),
        users in prop::collection::vec(user_strategy(), 0..3),
    ) {
        let record = users
            .into_iter()
            .fold(AddressRecord::new(name, scope), |r, u| r.with_user(u));
        prop_assert!(!classify(&record).has_consumer());
    }
}
