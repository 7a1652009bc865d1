//! Operation completion polling.
//!
//! Every mutating call returns an [`Operation`] that completes
//! asynchronously. The [`OperationWaiter`] blocks until the operation is
//! DONE, because the next deletion step is only safe once the previous one
//! has fully taken effect.

use std::thread;
use std::time::{Duration, Instant};

use crate::compute::{ComputeApi, Operation, OperationScope};
use crate::error::{Error, Result};

/// Polling cadence and bound for [`OperationWaiter`].
///
/// The interval between polls starts at `initial_interval` and is multiplied
/// by `multiplier` after each poll, never exceeding `max_interval`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ipenforcer::operations::WaitPolicy;
///
/// let policy = WaitPolicy::default();
/// let intervals: Vec<_> = policy.intervals().take(5).collect();
/// assert_eq!(intervals[0], Duration::from_secs(1));
/// assert_eq!(intervals[4], Duration::from_secs(8));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPolicy {
    /// Delay before the first poll.
    pub initial_interval: Duration,
    /// Upper bound on the delay between polls.
    pub max_interval: Duration,
    /// Growth factor applied after each poll.
    pub multiplier: f64,
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(8),
            multiplier: 2.0,
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl WaitPolicy {
    /// A policy that polls back to back without sleeping or timing out.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            multiplier: 1.0,
            timeout: None,
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the delay that follows `previous`.
    #[must_use]
    pub fn next_interval(&self, previous: Duration) -> Duration {
        if previous.is_zero() {
            return previous;
        }
        let factor = self.multiplier.max(1.0);
        // Clamp before converting back; mul_f64 panics on overflow.
        if previous.as_secs_f64() * factor >= self.max_interval.as_secs_f64() {
            return self.max_interval;
        }
        previous.mul_f64(factor).min(self.max_interval)
    }

    /// Returns the infinite sequence of delays between polls.
    pub fn intervals(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_interval.min(self.max_interval)), |prev| {
            Some(self.next_interval(*prev))
        })
    }
}

/// Polls operations until they reach DONE.
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::compute::{ComputeApi, Operation, OperationScope};
/// use ipenforcer::operations::{OperationWaiter, WaitPolicy};
///
/// fn finish(api: &dyn ComputeApi, op: Operation) -> ipenforcer::Result<Operation> {
///     let waiter = OperationWaiter::new(api, WaitPolicy::default());
///     waiter.wait("my-project", &OperationScope::Global, op)
/// }
/// ```
pub struct OperationWaiter<'a> {
    api: &'a dyn ComputeApi,
    policy: WaitPolicy,
}

impl<'a> OperationWaiter<'a> {
    /// Creates a waiter polling through `api`.
    #[must_use]
    pub fn new(api: &'a dyn ComputeApi, policy: WaitPolicy) -> Self {
        Self { api, policy }
    }

    /// Blocks until `operation` is DONE.
    ///
    /// An operation that is already DONE is resolved without polling.
    ///
    /// # Errors
    ///
    /// - [`Error::OperationFailed`] if the operation completed with an error
    /// - [`Error::OperationTimeout`] if the policy's timeout elapsed first
    /// - any error from the status poll itself
    pub fn wait(
        &self,
        project: &str,
        scope: &OperationScope,
        operation: Operation,
    ) -> Result<Operation> {
        if operation.is_done() {
            return Self::resolve(operation);
        }

        log::info!(
            "waiting for operation project={project} scope={scope} operation={}",
            operation.name
        );

        let started = Instant::now();
        let name = operation.name;
        let mut interval = self.policy.initial_interval.min(self.policy.max_interval);
        loop {
            if let Some(timeout) = self.policy.timeout {
                if started.elapsed() >= timeout {
                    return Err(Error::OperationTimeout {
                        operation: name,
                        seconds: timeout.as_secs(),
                    });
                }
            }

            if !interval.is_zero() {
                thread::sleep(interval);
            }

            let current = self.api.get_operation(project, scope, &name)?;
            log::debug!(
                "polled operation project={project} operation={name} status={:?}",
                current.status
            );
            if current.is_done() {
                return Self::resolve(current);
            }
            interval = self.policy.next_interval(interval);
        }
    }

    fn resolve(operation: Operation) -> Result<Operation> {
        match operation.error {
            Some(ref error) => {
                log::error!("operation failed operation={} error={error}", operation.name);
                Err(Error::OperationFailed {
                    details: error.to_string(),
                    operation: operation.name,
                })
            }
            None => {
                log::debug!("operation done operation={}", operation.name);
                Ok(operation)
            }
        }
    }
}
