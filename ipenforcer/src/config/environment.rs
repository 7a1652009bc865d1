//! Environment variable handling for configuration overrides.
//!
//! This module provides support for IPENFORCER_* environment variables that
//! override configuration file values.

use crate::config::schema::{Config, EnforcementConfig, WaitConfig};
use crate::error::{Error, Result};
use std::env;
use std::str::FromStr;

/// Overrides `enforcement.dry_run`.
pub const ENV_DRY_RUN: &str = "IPENFORCER_DRY_RUN";
/// Overrides `enforcement.max_parallel_projects`.
pub const ENV_MAX_PARALLEL_PROJECTS: &str = "IPENFORCER_MAX_PARALLEL_PROJECTS";
/// Overrides `wait.timeout_seconds`.
pub const ENV_OPERATION_TIMEOUT_SECONDS: &str = "IPENFORCER_OPERATION_TIMEOUT_SECONDS";
/// Overrides `enforcement.run_deadline_seconds`.
pub const ENV_RUN_DEADLINE_SECONDS: &str = "IPENFORCER_RUN_DEADLINE_SECONDS";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric count, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(val) = env::var(ENV_DRY_RUN) {
            Self::enforcement(config).dry_run = Some(Self::parse_bool(ENV_DRY_RUN, &val)?);
        }

        if let Ok(val) = env::var(ENV_MAX_PARALLEL_PROJECTS) {
            Self::enforcement(config).max_parallel_projects =
                Some(Self::parse_number(ENV_MAX_PARALLEL_PROJECTS, &val)?);
        }

        if let Ok(val) = env::var(ENV_RUN_DEADLINE_SECONDS) {
            Self::enforcement(config).run_deadline_seconds =
                Some(Self::parse_number(ENV_RUN_DEADLINE_SECONDS, &val)?);
        }

        if let Ok(val) = env::var(ENV_OPERATION_TIMEOUT_SECONDS) {
            let wait = config.wait.get_or_insert_with(WaitConfig::default);
            wait.timeout_seconds = Some(Self::parse_number(ENV_OPERATION_TIMEOUT_SECONDS, &val)?);
        }

        Ok(())
    }

    fn enforcement(config: &mut Config) -> &mut EnforcementConfig {
        config
            .enforcement
            .get_or_insert_with(EnforcementConfig::default)
    }

    /// Parse boolean from string.
    ///
    /// Accepts: true/false, 1/0, yes/no, on/off (case insensitive)
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    fn parse_number<T: FromStr>(field: &str, s: &str) -> Result<T> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            ENV_DRY_RUN,
            ENV_MAX_PARALLEL_PROJECTS,
            ENV_OPERATION_TIMEOUT_SECONDS,
            ENV_RUN_DEADLINE_SECONDS,
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_parse_bool_true_variants() {
        assert!(EnvironmentConfig::parse_bool("test", "true").unwrap());
        assert!(EnvironmentConfig::parse_bool("test", "TRUE").unwrap());
        assert!(EnvironmentConfig::parse_bool("test", "1").unwrap());
        assert!(EnvironmentConfig::parse_bool("test", "yes").unwrap());
        assert!(EnvironmentConfig::parse_bool("test", "on").unwrap());
    }

    #[test]
    fn test_parse_bool_false_variants() {
        assert!(!EnvironmentConfig::parse_bool("test", "false").unwrap());
        assert!(!EnvironmentConfig::parse_bool("test", "0").unwrap());
        assert!(!EnvironmentConfig::parse_bool("test", "NO").unwrap());
        assert!(!EnvironmentConfig::parse_bool("test", "off").unwrap());
    }

    #[test]
    fn test_parse_bool_invalid() {
        let result = EnvironmentConfig::parse_bool("test", "maybe");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_number_invalid() {
        let result: Result<usize> = EnvironmentConfig::parse_number("test", "-3");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_overrides_applied() {
        clear_env();
        env::set_var(ENV_DRY_RUN, "yes");
        env::set_var(ENV_MAX_PARALLEL_PROJECTS, "8");
        env::set_var(ENV_OPERATION_TIMEOUT_SECONDS, "45");
        env::set_var(ENV_RUN_DEADLINE_SECONDS, "900");

        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        clear_env();

        assert!(config.reconcile_options().dry_run);
        assert_eq!(config.max_parallel_projects(), 8);
        assert_eq!(
            config.wait_policy().timeout,
            Some(std::time::Duration::from_secs(45))
        );
        assert_eq!(
            config.run_deadline(),
            Some(std::time::Duration::from_secs(900))
        );
    }

    #[test]
    #[serial]
    fn test_overrides_keep_file_values() {
        clear_env();
        env::set_var(ENV_DRY_RUN, "false");

        let mut config: Config =
            serde_yaml::from_str("enforcement:\n  max_parallel_projects: 3\n").unwrap();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        clear_env();

        assert_eq!(config.max_parallel_projects(), 3);
        assert!(!config.reconcile_options().dry_run);
    }

    #[test]
    #[serial]
    fn test_invalid_override_is_rejected() {
        clear_env();
        env::set_var(ENV_MAX_PARALLEL_PROJECTS, "many");

        let mut config = Config::default();
        let result = EnvironmentConfig::apply_overrides(&mut config);
        clear_env();

        match result {
            Err(Error::Validation { field, .. }) => assert_eq!(field, ENV_MAX_PARALLEL_PROJECTS),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_no_env_leaves_config_untouched() {
        clear_env();
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }
}
