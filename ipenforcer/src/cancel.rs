//! Cooperative cancellation.
//!
//! A [`CancelToken`] is checked before each project and before each address.
//! It is never checked between a consumer delete and the matching address
//! release, so an address is never left half processed by cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional deadline.
///
/// Clones share the same flag.
///
/// # Examples
///
/// ```
/// use ipenforcer::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
///
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Creates a token that is only cancelled explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that also cancels once `budget` has elapsed.
    #[must_use]
    pub fn with_deadline(budget: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(budget),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested or the deadline passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Returns the reason recorded for work skipped because of cancellation.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        if self.flag.load(Ordering::SeqCst) {
            "run cancelled"
        } else {
            "run deadline reached"
        }
    }
}
