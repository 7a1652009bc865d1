//! Project selection.
//!
//! Resolves a host project into the list of projects to enforce, honouring
//! the exclusion list kept in the host's storage bucket.

pub mod exclusions;
pub mod selector;

pub use exclusions::ExclusionSet;
pub use selector::{ExclusionSource, ProjectSelector, ProjectSource};
