//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for ipenforcer:
//! host profiles, the exclusion source, operation polling, and enforcement
//! behaviour.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::operations::{ReconcileOptions, WaitPolicy};

/// Suffix appended to the host project id to name the exclusion bucket.
pub const DEFAULT_BUCKET_SUFFIX: &str = "-data-files";

/// Object holding the JSONL exclusion list.
pub const DEFAULT_EXCLUSION_OBJECT: &str = "oceanEIMExclusion.jsonl";

/// Fragments excluded even when the exclusion object does not list them.
pub const DEFAULT_BUILTIN_EXCLUSIONS: &[&str] = &["xpn"];

/// Complete configuration structure.
///
/// Every section is optional; accessors fall back to built-in defaults.
///
/// # Examples
///
/// ```
/// use ipenforcer::config::{Config, EnforcementConfig};
///
/// let config = Config {
///     enforcement: Some(EnforcementConfig {
///         dry_run: Some(true),
///         ..Default::default()
///     }),
///     ..Default::default()
/// };
/// assert!(config.reconcile_options().dry_run);
/// assert_eq!(config.max_parallel_projects(), 1);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Host project profiles, keyed by host project id.
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,

    /// Where the exclusion list lives.
    pub exclusions: Option<ExclusionConfig>,

    /// Operation polling.
    pub wait: Option<WaitConfig>,

    /// Enforcement behaviour.
    pub enforcement: Option<EnforcementConfig>,
}

/// Which projects a host profile enforces.
///
/// Exactly one of `projects` or `folder_id` must be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// A fixed list of project ids.
    pub projects: Option<Vec<String>>,

    /// A folder whose active projects are enforced.
    pub folder_id: Option<String>,
}

/// Exclusion list location and built-in fragments.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExclusionConfig {
    /// Bucket name suffix, appended to the host project id.
    pub bucket_suffix: Option<String>,

    /// Object name inside the bucket.
    pub object: Option<String>,

    /// Fragments always excluded.
    pub builtin: Option<Vec<String>>,
}

/// Operation polling settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WaitConfig {
    /// Delay before the first poll, in milliseconds.
    pub initial_interval_ms: Option<u64>,

    /// Upper bound on the delay between polls, in milliseconds.
    pub max_interval_ms: Option<u64>,

    /// Growth factor applied after each poll.
    pub multiplier: Option<f64>,

    /// Give up on an operation after this many seconds.
    pub timeout_seconds: Option<u64>,
}

/// Enforcement behaviour.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnforcementConfig {
    /// Record plans without issuing deletes.
    pub dry_run: Option<bool>,

    /// Wait for the address release operation to finish.
    pub wait_for_address_release: Option<bool>,

    /// Number of projects processed at once.
    pub max_parallel_projects: Option<usize>,

    /// Stop starting new work after this many seconds.
    pub run_deadline_seconds: Option<u64>,
}

impl Config {
    /// Returns the profile of a host project.
    #[must_use]
    pub fn host(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(host)
    }

    /// Returns the exclusion bucket suffix.
    #[must_use]
    pub fn bucket_suffix(&self) -> &str {
        self.exclusions
            .as_ref()
            .and_then(|e| e.bucket_suffix.as_deref())
            .unwrap_or(DEFAULT_BUCKET_SUFFIX)
    }

    /// Returns the exclusion object name.
    #[must_use]
    pub fn exclusion_object(&self) -> &str {
        self.exclusions
            .as_ref()
            .and_then(|e| e.object.as_deref())
            .unwrap_or(DEFAULT_EXCLUSION_OBJECT)
    }

    /// Returns the built-in exclusion fragments.
    #[must_use]
    pub fn builtin_exclusions(&self) -> Vec<String> {
        match self.exclusions.as_ref().and_then(|e| e.builtin.as_ref()) {
            Some(builtin) => builtin.clone(),
            None => DEFAULT_BUILTIN_EXCLUSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Builds the operation polling policy.
    #[must_use]
    pub fn wait_policy(&self) -> WaitPolicy {
        let defaults = WaitPolicy::default();
        let Some(wait) = &self.wait else {
            return defaults;
        };
        WaitPolicy {
            initial_interval: wait
                .initial_interval_ms
                .map_or(defaults.initial_interval, Duration::from_millis),
            max_interval: wait
                .max_interval_ms
                .map_or(defaults.max_interval, Duration::from_millis),
            multiplier: wait.multiplier.unwrap_or(defaults.multiplier),
            timeout: wait
                .timeout_seconds
                .map(Duration::from_secs)
                .or(defaults.timeout),
        }
    }

    /// Builds the per-project reconciliation settings.
    #[must_use]
    pub fn reconcile_options(&self) -> ReconcileOptions {
        let enforcement = self.enforcement.clone().unwrap_or_default();
        ReconcileOptions::default()
            .with_dry_run(enforcement.dry_run.unwrap_or(false))
            .with_wait_for_address_release(enforcement.wait_for_address_release.unwrap_or(true))
            .with_wait_policy(self.wait_policy())
    }

    /// Returns how many projects may be processed at once.
    #[must_use]
    pub fn max_parallel_projects(&self) -> usize {
        self.enforcement
            .as_ref()
            .and_then(|e| e.max_parallel_projects)
            .unwrap_or(1)
    }

    /// Returns the run deadline, if any.
    #[must_use]
    pub fn run_deadline(&self) -> Option<Duration> {
        self.enforcement
            .as_ref()
            .and_then(|e| e.run_deadline_seconds)
            .map(Duration::from_secs)
    }
}
