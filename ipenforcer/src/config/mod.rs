//! Configuration system for ipenforcer.
//!
//! This module provides:
//! - YAML configuration files (`ipenforcer.yaml` or an explicit path)
//! - Environment variable overrides
//! - Validation
//!
//! # Configuration Precedence
//!
//! Highest to lowest:
//!
//! 1. Environment variables (IPENFORCER_*)
//! 2. The configuration file
//! 3. Built-in defaults
//!
//! Command-line flags are applied on top by the CLI.
//!
//! # Examples
//!
//! ```no_run
//! use ipenforcer::config::ConfigLoader;
//! use std::path::Path;
//!
//! let source = ConfigLoader::load_effective(None, Path::new(".")).unwrap();
//! println!("parallelism: {}", source.config.max_parallel_projects());
//! ```
//!
//! Programmatic configuration:
//!
//! ```
//! use ipenforcer::config::{Config, WaitConfig};
//! use std::time::Duration;
//!
//! let config = Config {
//!     wait: Some(WaitConfig {
//!         timeout_seconds: Some(30),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//!
//! assert_eq!(config.wait_policy().timeout, Some(Duration::from_secs(30)));
//! ```

pub mod environment;
pub mod loader;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

// Re-export key types at module root
pub use environment::{
    EnvironmentConfig, ENV_DRY_RUN, ENV_MAX_PARALLEL_PROJECTS, ENV_OPERATION_TIMEOUT_SECONDS,
    ENV_RUN_DEADLINE_SECONDS,
};
pub use loader::{ConfigLoader, ConfigSource, DEFAULT_CONFIG_FILE};
pub use schema::{
    Config, EnforcementConfig, ExclusionConfig, HostConfig, WaitConfig, DEFAULT_BUCKET_SUFFIX,
    DEFAULT_BUILTIN_EXCLUSIONS, DEFAULT_EXCLUSION_OBJECT,
};
pub use validator::ConfigValidator;
