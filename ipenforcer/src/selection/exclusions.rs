//! Project exclusion list.
//!
//! The list is stored as JSON Lines. Each line is an object whose first
//! value, in document order, names a fragment. Any project id containing a
//! fragment is left alone.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A set of project id fragments to exclude.
///
/// # Examples
///
/// ```
/// use ipenforcer::selection::ExclusionSet;
///
/// let text = r#"{"project": "legacy-billing", "owner": "finance"}
/// {"project": "sandbox"}
/// "#;
/// let exclusions = ExclusionSet::from_jsonl(text, &["xpn".to_string()]).unwrap();
///
/// assert!(exclusions.is_excluded("acme-legacy-billing-prod"));
/// assert!(exclusions.is_excluded("acme-xpn-host"));
/// assert!(!exclusions.is_excluded("acme-web-prod"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    fragments: Vec<String>,
}

impl ExclusionSet {
    /// Creates a set from fragments. Empty fragments are dropped.
    #[must_use]
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for fragment in fragments {
            set.push(fragment.into());
        }
        set
    }

    /// Parses a JSON Lines exclusion list and appends `builtins`.
    ///
    /// Blank lines are ignored. Objects with no values or whose first value
    /// is not a string contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank line is not a JSON object.
    pub fn from_jsonl(text: &str, builtins: &[String]) -> Result<Self> {
        let mut set = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: Map<String, Value> =
                serde_json::from_str(line).map_err(|e| Error::Validation {
                    field: format!("exclusions line {}", index + 1),
                    message: e.to_string(),
                })?;
            match entry.values().next() {
                Some(Value::String(fragment)) => set.push(fragment.clone()),
                Some(other) => log::warn!(
                    "ignoring exclusion entry line={} value={other}",
                    index + 1
                ),
                None => {}
            }
        }

        for builtin in builtins {
            set.push(builtin.clone());
        }
        Ok(set)
    }

    fn push(&mut self, fragment: String) {
        let fragment = fragment.trim().to_string();
        if !fragment.is_empty() && !self.fragments.contains(&fragment) {
            self.fragments.push(fragment);
        }
    }

    /// Returns true if `project_id` contains any fragment.
    #[must_use]
    pub fn is_excluded(&self, project_id: &str) -> bool {
        self.fragments
            .iter()
            .any(|fragment| project_id.contains(fragment.as_str()))
    }

    /// Returns the fragments in insertion order.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Returns the number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_is_the_fragment() {
        let set = ExclusionSet::from_jsonl(r#"{"b": "beta", "a": "alpha"}"#, &[]).unwrap();
        assert_eq!(set.fragments(), &["beta".to_string()]);
    }

    #[test]
    fn test_empty_fragments_are_ignored() {
        let set = ExclusionSet::from_jsonl("{\"p\": \"\"}\n\n{}\n", &[]).unwrap();
        assert!(set.is_empty());
        assert!(!set.is_excluded("anything"));
    }

    #[test]
    fn test_builtins_are_appended_once() {
        let builtins = vec!["xpn".to_string()];
        let set =
            ExclusionSet::from_jsonl("{\"p\": \"xpn\"}\n{\"p\": \"dev\"}\n", &builtins).unwrap();
        assert_eq!(set.fragments(), &["xpn".to_string(), "dev".to_string()]);
    }

    #[test]
    fn test_non_string_value_is_skipped() {
        let set = ExclusionSet::from_jsonl("{\"p\": 42}\n", &[]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        let err = ExclusionSet::from_jsonl("{\"p\": \"ok\"}\nnot json\n", &[]).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_substring_match() {
        let set = ExclusionSet::new(["-shared-"]);
        assert!(set.is_excluded("team-shared-vpc"));
        assert!(!set.is_excluded("team-shared"));
    }
}
