//! Configuration validation.
//!
//! This module checks every configuration field for values that would make
//! an enforcement run misbehave, before any request is issued.

use std::time::Duration;

use crate::config::schema::{Config, EnforcementConfig, ExclusionConfig, HostConfig, WaitConfig};
use crate::error::{Error, Result};
use crate::operations::WaitPolicy;

/// Validates configuration.
///
/// # Examples
///
/// ```
/// use ipenforcer::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns validation errors for invalid configurations.
    pub fn validate(config: &Config) -> Result<()> {
        for (host, profile) in &config.hosts {
            Self::validate_identifier("hosts", host)?;
            Self::validate_host(host, profile)?;
        }

        if let Some(ref exclusions) = config.exclusions {
            Self::validate_exclusions(exclusions)?;
        }

        if let Some(ref wait) = config.wait {
            Self::validate_wait(wait)?;
        }

        if let Some(ref enforcement) = config.enforcement {
            Self::validate_enforcement(enforcement)?;
        }

        Ok(())
    }

    fn validate_host(host: &str, profile: &HostConfig) -> Result<()> {
        let field = format!("hosts.{host}");
        match (&profile.projects, &profile.folder_id) {
            (Some(_), Some(_)) => Err(Error::Validation {
                field,
                message: "projects and folder_id are mutually exclusive".into(),
            }),
            (None, None) => Err(Error::Validation {
                field,
                message: "one of projects or folder_id is required".into(),
            }),
            (Some(projects), None) => {
                for project in projects {
                    Self::validate_identifier(&format!("{field}.projects"), project)?;
                }
                Ok(())
            }
            (None, Some(folder)) => {
                if folder.is_empty() || !folder.chars().all(|c| c.is_ascii_digit()) {
                    return Err(Error::Validation {
                        field: format!("{field}.folder_id"),
                        message: format!("folder id must be numeric, got '{folder}'"),
                    });
                }
                Ok(())
            }
        }
    }

    fn validate_exclusions(exclusions: &ExclusionConfig) -> Result<()> {
        if let Some(ref object) = exclusions.object {
            if object.trim().is_empty() {
                return Err(Error::Validation {
                    field: "exclusions.object".into(),
                    message: "Object name cannot be empty".into(),
                });
            }
        }

        if let Some(ref builtin) = exclusions.builtin {
            if builtin.iter().any(|fragment| fragment.is_empty()) {
                return Err(Error::Validation {
                    field: "exclusions.builtin".into(),
                    message: "Empty fragments would exclude every project".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_wait(wait: &WaitConfig) -> Result<()> {
        if let Some(multiplier) = wait.multiplier {
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err(Error::Validation {
                    field: "wait.multiplier".into(),
                    message: format!("Multiplier must be at least 1, got {multiplier}"),
                });
            }
        }

        // Unset bounds fall back to the default policy.
        let defaults = WaitPolicy::default();
        let initial = wait
            .initial_interval_ms
            .map_or(defaults.initial_interval, Duration::from_millis);
        let max = wait
            .max_interval_ms
            .map_or(defaults.max_interval, Duration::from_millis);
        if max < initial {
            let field = if wait.max_interval_ms.is_some() {
                "wait.max_interval_ms"
            } else {
                "wait.initial_interval_ms"
            };
            return Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Max interval ({}ms) must not be below initial interval ({}ms)",
                    max.as_millis(),
                    initial.as_millis()
                ),
            });
        }

        if wait.timeout_seconds == Some(0) {
            return Err(Error::Validation {
                field: "wait.timeout_seconds".into(),
                message: "Timeout must be greater than 0".into(),
            });
        }

        Ok(())
    }

    fn validate_enforcement(enforcement: &EnforcementConfig) -> Result<()> {
        if enforcement.max_parallel_projects == Some(0) {
            return Err(Error::Validation {
                field: "enforcement.max_parallel_projects".into(),
                message: "Parallelism must be greater than 0".into(),
            });
        }

        if enforcement.run_deadline_seconds == Some(0) {
            return Err(Error::Validation {
                field: "enforcement.run_deadline_seconds".into(),
                message: "Deadline must be greater than 0".into(),
            });
        }

        Ok(())
    }

    /// Validate a project or host identifier.
    fn validate_identifier(field: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Identifier cannot be empty".into(),
            });
        }

        if trimmed != value || value.chars().any(char::is_whitespace) {
            return Err(Error::Validation {
                field: field.into(),
                message: format!("Identifier '{value}' cannot contain whitespace"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn assert_invalid(yaml: &str, expected_field: &str) {
        match ConfigValidator::validate(&parse(yaml)) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected validation error for {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_profiles() {
        let config = parse(
            "hosts:\n  host-a:\n    projects: [p1, p2]\n  host-b:\n    folder_id: \"42\"\n",
        );
        ConfigValidator::validate(&config).unwrap();
    }

    #[test]
    fn test_host_needs_exactly_one_source() {
        assert_invalid("hosts:\n  host-a: {}\n", "hosts.host-a");
        assert_invalid(
            "hosts:\n  host-a:\n    projects: [p1]\n    folder_id: \"1\"\n",
            "hosts.host-a",
        );
    }

    #[test]
    fn test_folder_id_must_be_numeric() {
        assert_invalid(
            "hosts:\n  host-a:\n    folder_id: folders/1\n",
            "hosts.host-a.folder_id",
        );
    }

    #[test]
    fn test_project_ids_cannot_be_blank() {
        assert_invalid(
            "hosts:\n  host-a:\n    projects: [\"\"]\n",
            "hosts.host-a.projects",
        );
    }

    #[test]
    fn test_wait_bounds() {
        assert_invalid("wait:\n  multiplier: 0.5\n", "wait.multiplier");
        assert_invalid(
            "wait:\n  initial_interval_ms: 500\n  max_interval_ms: 100\n",
            "wait.max_interval_ms",
        );
        assert_invalid("wait:\n  timeout_seconds: 0\n", "wait.timeout_seconds");
    }

    #[test]
    fn test_single_bound_checked_against_default() {
        // Default cap is 8s.
        assert_invalid(
            "wait:\n  initial_interval_ms: 20000\n",
            "wait.initial_interval_ms",
        );
        // Default initial interval is 1s.
        assert_invalid("wait:\n  max_interval_ms: 500\n", "wait.max_interval_ms");
        ConfigValidator::validate(&parse("wait:\n  initial_interval_ms: 8000\n")).unwrap();
        ConfigValidator::validate(&parse("wait:\n  max_interval_ms: 30000\n")).unwrap();
    }

    #[test]
    fn test_extreme_multiplier_accepted_and_bounded() {
        let config = parse("wait:\n  multiplier: 1.0e300\n");
        ConfigValidator::validate(&config).unwrap();

        let policy = config.wait_policy();
        let intervals: Vec<_> = policy.intervals().take(3).collect();
        assert!(intervals.iter().all(|d| *d <= policy.max_interval));
        assert_eq!(intervals[2], policy.max_interval);
    }

    #[test]
    fn test_enforcement_bounds() {
        assert_invalid(
            "enforcement:\n  max_parallel_projects: 0\n",
            "enforcement.max_parallel_projects",
        );
        assert_invalid(
            "enforcement:\n  run_deadline_seconds: 0\n",
            "enforcement.run_deadline_seconds",
        );
    }

    #[test]
    fn test_empty_builtin_fragment_rejected() {
        assert_invalid("exclusions:\n  builtin: [xpn, \"\"]\n", "exclusions.builtin");
    }
}
