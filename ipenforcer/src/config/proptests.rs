//! Property-based tests for the configuration system.

use super::schema::{Config, WaitConfig};
use super::validator::ConfigValidator;
use proptest::prelude::*;
use std::time::Duration;

// Wait settings that the validator accepts
fn valid_wait_strategy() -> impl Strategy<Value = WaitConfig> {
    let multiplier = prop_oneof![1.0f64..4.0, 4.0f64..1.0e6, 1.0e6f64..f64::MAX];
    (0u64..5_000, 0u64..5_000, multiplier, 1u64..3_600).prop_map(
        |(initial, extra, multiplier, timeout)| WaitConfig {
            initial_interval_ms: Some(initial),
            max_interval_ms: Some(initial + extra),
            multiplier: Some(multiplier),
            timeout_seconds: Some(timeout),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // Accepted wait settings never poll slower than the configured cap
    #[test]
    fn valid_wait_never_exceeds_cap(wait in valid_wait_strategy()) {
        let config = Config {
            wait: Some(wait.clone()),
            ..Default::default()
        };
        prop_assert!(ConfigValidator::validate(&config).is_ok());

        let policy = config.wait_policy();
        let cap = Duration::from_millis(wait.max_interval_ms.unwrap_or_default());
        for interval in policy.intervals().take(20) {
            prop_assert!(interval <= cap);
        }
    }

    // Intervals never shrink between polls
    #[test]
    fn intervals_are_monotonic(wait in valid_wait_strategy()) {
        let config = Config {
            wait: Some(wait),
            ..Default::default()
        };
        let intervals: Vec<_> = config.wait_policy().intervals().take(20).collect();
        for pair in intervals.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    // An initial interval alone is checked against the default cap
    #[test]
    fn lone_initial_interval_respects_default_cap(initial in 0u64..60_000) {
        let config = Config {
            wait: Some(WaitConfig {
                initial_interval_ms: Some(initial),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cap = config.wait_policy().max_interval;
        let accepted = ConfigValidator::validate(&config).is_ok();
        prop_assert_eq!(accepted, Duration::from_millis(initial) <= cap);
    }

    // A cap below the initial interval is always rejected
    #[test]
    fn inverted_bounds_rejected(initial in 1u64..10_000, gap in 1u64..1_000) {
        let config = Config {
            wait: Some(WaitConfig {
                initial_interval_ms: Some(initial + gap),
                max_interval_ms: Some(initial),
                ..Default::default()
            }),
            ..Default::default()
        };
        prop_assert!(ConfigValidator::validate(&config).is_err());
    }
}
